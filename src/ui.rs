use anyhow::Result;
use crossterm::{
    event::{self, Event, KeyCode, KeyEventKind, KeyModifiers},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{
    backend::CrosstermBackend,
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    symbols,
    text::{Line, Span},
    widgets::{
        canvas::{Canvas, Points},
        Bar, BarChart, BarGroup, Block, Borders, Cell, Paragraph, Row, Table, TableState, Wrap,
    },
    Frame, Terminal,
};
use registry_dashboard::{
    BarChartData, Bucket, DashboardView, LicenseCategory, LicenseStatus, MapLayer, MapPoint,
    SessionContext, Widget,
};
use std::io;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Page {
    Categories,
    Status,
    Equity,
    Map,
}

impl Page {
    pub const ALL: [Page; 4] = [Page::Categories, Page::Status, Page::Equity, Page::Map];

    pub fn next(&self) -> Self {
        match self {
            Page::Categories => Page::Status,
            Page::Status => Page::Equity,
            Page::Equity => Page::Map,
            Page::Map => Page::Categories,
        }
    }

    pub fn previous(&self) -> Self {
        match self {
            Page::Categories => Page::Map,
            Page::Status => Page::Categories,
            Page::Equity => Page::Status,
            Page::Map => Page::Equity,
        }
    }

    pub fn title(&self) -> &str {
        match self {
            Page::Categories => "License Categories",
            Page::Status => "License Status",
            Page::Equity => "Equity Program",
            Page::Map => "Map",
        }
    }
}

pub struct App {
    pub session: SessionContext,
    pub view: DashboardView,
    pub current_page: Page,
    pub map_state: TableState,
}

impl App {
    pub fn new(session: SessionContext) -> Self {
        let view = session.render();

        let mut map_state = TableState::default();
        if view.map.ready().map_or(false, |m| !m.points.is_empty()) {
            map_state.select(Some(0));
        }

        Self {
            session,
            view,
            current_page: Page::Categories,
            map_state,
        }
    }

    /// Recompute every widget after a selection change
    fn refresh(&mut self) {
        self.view = self.session.render();
    }

    pub fn next_category(&mut self) {
        self.session.selection_mut().next_category();
        self.refresh();
    }

    pub fn previous_category(&mut self) {
        self.session.selection_mut().previous_category();
        self.refresh();
    }

    pub fn next_status(&mut self) {
        self.session.selection_mut().next_status();
        self.refresh();
    }

    pub fn previous_status(&mut self) {
        self.session.selection_mut().previous_status();
        self.refresh();
    }

    pub fn next_page(&mut self) {
        self.current_page = self.current_page.next();
    }

    pub fn previous_page(&mut self) {
        self.current_page = self.current_page.previous();
    }

    fn map_len(&self) -> usize {
        self.view.map.ready().map_or(0, |m| m.points.len())
    }

    pub fn next_point(&mut self) {
        let len = self.map_len();
        if len == 0 {
            return;
        }
        let i = match self.map_state.selected() {
            Some(i) if i + 1 < len => i + 1,
            _ => 0,
        };
        self.map_state.select(Some(i));
    }

    pub fn previous_point(&mut self) {
        let len = self.map_len();
        if len == 0 {
            return;
        }
        let i = match self.map_state.selected() {
            Some(0) | None => len - 1,
            Some(i) => i - 1,
        };
        self.map_state.select(Some(i));
    }
}

pub fn run_ui(app: &mut App) -> Result<()> {
    // Setup terminal
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let res = run_app(&mut terminal, app);

    // Restore terminal
    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    res?;
    Ok(())
}

fn run_app<B: ratatui::backend::Backend>(
    terminal: &mut Terminal<B>,
    app: &mut App,
) -> io::Result<()> {
    loop {
        terminal.draw(|f| ui(f, app))?;

        if let Event::Key(key) = event::read()? {
            if key.kind != KeyEventKind::Press {
                continue;
            }
            match key.code {
                KeyCode::Char('q') | KeyCode::Esc => return Ok(()),
                KeyCode::Tab => app.next_page(),
                KeyCode::BackTab => app.previous_page(),
                KeyCode::Char('c') if key.modifiers.contains(KeyModifiers::CONTROL) => return Ok(()),
                KeyCode::Down | KeyCode::Char('j') if app.current_page == Page::Map => app.next_point(),
                KeyCode::Up | KeyCode::Char('k') if app.current_page == Page::Map => app.previous_point(),
                KeyCode::Down | KeyCode::Char('j') => app.next_category(),
                KeyCode::Up | KeyCode::Char('k') => app.previous_category(),
                KeyCode::Right | KeyCode::Char('l') => app.next_status(),
                KeyCode::Left | KeyCode::Char('h') => app.previous_status(),
                _ => {}
            }
        }
    }
}

fn ui(f: &mut Frame, app: &mut App) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(4), // Header: navigation + dataset origin
            Constraint::Min(0),    // Content area
            Constraint::Length(3), // Status bar
        ])
        .split(f.size());

    render_header(f, chunks[0], app);

    match app.current_page {
        Page::Categories => render_categories(f, chunks[1], app),
        Page::Status => render_status(f, chunks[1], app),
        Page::Equity => render_equity(f, chunks[1], app),
        Page::Map => render_map(f, chunks[1], app),
    }

    render_status_bar(f, chunks[2], app);
}

fn render_header(f: &mut Frame, area: Rect, app: &App) {
    let mut tab_spans = vec![];
    for (i, page) in Page::ALL.iter().enumerate() {
        if i > 0 {
            tab_spans.push(Span::raw(" │ "));
        }

        let style = if *page == app.current_page {
            Style::default()
                .fg(Color::Yellow)
                .add_modifier(Modifier::BOLD | Modifier::UNDERLINED)
        } else {
            Style::default().fg(Color::DarkGray)
        };

        tab_spans.push(Span::styled(page.title().to_string(), style));
    }

    tab_spans.push(Span::raw("  |  "));
    tab_spans.push(Span::styled(
        format!("Registries: {}", app.view.total_records),
        Style::default().fg(Color::White),
    ));

    let header = Paragraph::new(vec![Line::from(tab_spans), dataset_line(&app.view)]).block(
        Block::default()
            .borders(Borders::ALL)
            .border_style(Style::default().fg(Color::Green))
            .title(" Massachusetts Cannabis Registries "),
    );

    f.render_widget(header, area);
}

/// Where the data came from and when it was read
fn dataset_line(view: &DashboardView) -> Line<'static> {
    let info = &view.dataset;
    Line::from(vec![
        Span::styled(
            info.source.clone().unwrap_or_else(|| "(in memory)".to_string()),
            Style::default().fg(Color::White),
        ),
        Span::raw("  |  "),
        Span::styled(
            format!("loaded {}", info.loaded_at.format("%Y-%m-%d %H:%M:%S UTC")),
            Style::default().fg(Color::DarkGray),
        ),
        Span::raw("  |  "),
        Span::styled(
            format!("sha256 {}", info.short_fingerprint()),
            Style::default().fg(Color::DarkGray),
        ),
    ])
}

fn render_status_bar(f: &mut Frame, area: Rect, app: &App) {
    let selection = app.view.selection;

    let status_spans = vec![
        Span::styled(
            format!(" Category: {} ", selection.selected_category()),
            Style::default().fg(Color::Cyan),
        ),
        Span::raw("| "),
        Span::styled(
            format!("Status: {} ", selection.selected_status()),
            Style::default().fg(Color::Cyan),
        ),
        Span::raw("| "),
        Span::styled("↑/↓", Style::default().fg(Color::Yellow)),
        Span::raw(if app.current_page == Page::Map { " Registry | " } else { " Category | " }),
        Span::styled("←/→", Style::default().fg(Color::Yellow)),
        Span::raw(" Status | "),
        Span::styled("Tab", Style::default().fg(Color::Yellow)),
        Span::raw(" Page | "),
        Span::styled("q", Style::default().fg(Color::Red)),
        Span::raw(" Quit"),
    ];

    let status_bar = Paragraph::new(vec![Line::from(status_spans)]).block(
        Block::default()
            .borders(Borders::ALL)
            .border_style(Style::default().fg(Color::White)),
    );

    f.render_widget(status_bar, area);
}

fn render_failed(f: &mut Frame, area: Rect, title: &str, message: &str) {
    let paragraph = Paragraph::new(vec![
        Line::from(""),
        Line::from(Span::styled(
            format!("  Unavailable: {}", message),
            Style::default().fg(Color::Red),
        )),
    ])
    .wrap(Wrap { trim: false })
    .block(
        Block::default()
            .borders(Borders::ALL)
            .border_style(Style::default().fg(Color::Red))
            .title(format!(" {} ", title)),
    );
    f.render_widget(paragraph, area);
}

fn render_categories(f: &mut Frame, area: Rect, app: &App) {
    let columns = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Length(34), Constraint::Min(0)])
        .split(area);

    // Dropdown
    let selected = app.view.selection.selected_category();
    let mut lines = vec![Line::from("")];
    for category in LicenseCategory::ALL {
        let line = if *category == selected {
            Line::from(vec![
                Span::styled(" → ", Style::default().fg(Color::Green).add_modifier(Modifier::BOLD)),
                Span::styled(category.label(), Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD)),
            ])
        } else {
            Line::from(vec![Span::raw("   "), Span::raw(category.label())])
        };
        lines.push(line);
    }
    lines.push(Line::from(""));
    lines.push(Line::from(Span::styled(
        app.view.category_summary.clone(),
        Style::default().fg(Color::White).add_modifier(Modifier::ITALIC),
    )));

    let dropdown = Paragraph::new(lines).wrap(Wrap { trim: true }).block(
        Block::default()
            .borders(Borders::ALL)
            .border_style(Style::default().fg(Color::White))
            .title(" Select a license category "),
    );
    f.render_widget(dropdown, columns[0]);

    let pie = match &app.view.category_pie {
        Widget::Ready { data } => data,
        Widget::Failed { message } => return render_failed(f, columns[1], "Pie Chart", message),
    };

    let header = Row::new(["Category", "Count", "Share", ""].iter().map(|h| {
        Cell::from(*h).style(Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD))
    }))
    .style(Style::default().bg(Color::DarkGray));

    let rows = pie.slices.iter().map(|slice| {
        let width = (slice.fraction * 30.0).round() as usize;
        let style = if slice.emphasized {
            Style::default().fg(Color::Green).add_modifier(Modifier::BOLD)
        } else {
            Style::default().fg(Color::White)
        };
        let label = if slice.emphasized {
            format!("→ {}", slice.label)
        } else {
            format!("  {}", slice.label)
        };

        Row::new(vec![
            Cell::from(label),
            Cell::from(slice.value.to_string()),
            Cell::from(format!("{:>5.1}%", slice.fraction * 100.0)),
            Cell::from("█".repeat(width)),
        ])
        .style(style)
    });

    let table = Table::new(
        rows,
        [
            Constraint::Length(16),
            Constraint::Length(8),
            Constraint::Length(8),
            Constraint::Min(10),
        ],
    )
    .header(header)
    .block(
        Block::default()
            .borders(Borders::ALL)
            .border_style(Style::default().fg(Color::White))
            .title(format!(" {} ", pie.title)),
    );

    f.render_widget(table, columns[1]);
}

fn render_bar_chart(f: &mut Frame, area: Rect, chart: &Widget<BarChartData>, color: Color, highlight: Option<&str>) {
    let chart = match chart {
        Widget::Ready { data } => data,
        Widget::Failed { message } => return render_failed(f, area, "Bar Chart", message),
    };

    let bars: Vec<Bar> = chart
        .points
        .iter()
        .map(|p| {
            let fill = if highlight == Some(p.label.as_str()) { Color::Yellow } else { color };
            Bar::default()
                .value(p.value)
                .label(Line::from(p.label.clone()))
                .style(Style::default().fg(fill))
                .value_style(Style::default().fg(Color::Black).bg(fill).add_modifier(Modifier::BOLD))
        })
        .collect();

    let bar_width = if chart.points.is_empty() {
        1
    } else {
        (area.width.saturating_sub(2) / chart.points.len() as u16).saturating_sub(2).clamp(3, 16)
    };

    let widget = BarChart::default()
        .block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(Style::default().fg(Color::White))
                .title(format!(" {} ({} by {}) ", chart.title, chart.y_label, chart.x_label)),
        )
        .data(BarGroup::default().bars(&bars))
        .bar_width(bar_width)
        .bar_gap(2)
        .max(chart.max_value().max(1));

    f.render_widget(widget, area);
}

fn render_status(f: &mut Frame, area: Rect, app: &App) {
    let rows = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Length(5), Constraint::Min(0)])
        .split(area);

    // Radio group
    let selected = app.view.selection.selected_status();
    let mut radio = vec![];
    for status in LicenseStatus::ALL {
        let marker = if *status == selected { "(●) " } else { "( ) " };
        let style = if *status == selected {
            Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD)
        } else {
            Style::default().fg(Color::DarkGray)
        };
        radio.push(Span::styled(format!("{}{}   ", marker, status.label()), style));
    }

    let radio_panel = Paragraph::new(vec![
        Line::from(radio),
        Line::from(""),
        Line::from(Span::styled(
            app.view.status_summary.clone(),
            Style::default().fg(Color::White).add_modifier(Modifier::ITALIC),
        )),
    ])
    .block(
        Block::default()
            .borders(Borders::ALL)
            .border_style(Style::default().fg(Color::White))
            .title(" Select a license status "),
    );
    f.render_widget(radio_panel, rows[0]);

    render_bar_chart(f, rows[1], &app.view.status_bar, Color::Green, Some(selected.label()));
}

fn render_equity(f: &mut Frame, area: Rect, app: &App) {
    render_bar_chart(f, area, &app.view.equity_bar, Color::LightGreen, None);
}

fn render_map(f: &mut Frame, area: Rect, app: &mut App) {
    let layer: MapLayer = match &app.view.map {
        Widget::Ready { data } => data.clone(),
        Widget::Failed { message } => return render_failed(f, area, "Map", message),
    };

    let columns = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(55), Constraint::Percentage(45)])
        .split(area);

    let selected = app.map_state.selected().and_then(|i| layer.points.get(i));

    // Scatter layer
    let (x0, x1, y0, y1) = layer.bounds().unwrap_or((-71.2, -70.9, 42.2, 42.4));
    let pad_x = ((x1 - x0) * 0.05).max(0.005);
    let pad_y = ((y1 - y0) * 0.05).max(0.005);
    let [r, g, b] = layer.color;

    let coords: Vec<(f64, f64)> = layer.points.iter().map(|p| (p.longitude, p.latitude)).collect();
    let highlight: Vec<(f64, f64)> = selected.map(|p| vec![(p.longitude, p.latitude)]).unwrap_or_default();

    let canvas = Canvas::default()
        .block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(Style::default().fg(Color::White))
                .title(" Cannabis Registries in Massachusetts "),
        )
        .marker(symbols::Marker::Braille)
        .x_bounds([x0 - pad_x, x1 + pad_x])
        .y_bounds([y0 - pad_y, y1 + pad_y])
        .paint(move |ctx| {
            ctx.draw(&Points {
                coords: &coords,
                color: Color::Rgb(r, g, b),
            });
            ctx.layer();
            ctx.draw(&Points {
                coords: &highlight,
                color: Color::Yellow,
            });
        });
    f.render_widget(canvas, columns[0]);

    let right = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Min(0), Constraint::Length(7)])
        .split(columns[1]);

    // Registry list
    let rows = layer.points.iter().map(|p| {
        Row::new(vec![
            Cell::from(truncate(p.name.as_deref().unwrap_or("Unknown"), 28)),
            Cell::from(p.zip_code.clone().unwrap_or_default()),
        ])
    });

    let table = Table::new(rows, [Constraint::Min(20), Constraint::Length(7)])
        .header(
            Row::new(["Registry", "Zip"].iter().map(|h| {
                Cell::from(*h).style(Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD))
            }))
            .style(Style::default().bg(Color::DarkGray)),
        )
        .block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(Style::default().fg(Color::White))
                .title(format!(" {} located ", layer.points.len())),
        )
        .highlight_style(Style::default().bg(Color::DarkGray).add_modifier(Modifier::BOLD))
        .highlight_symbol("→ ");

    f.render_stateful_widget(table, right[0], &mut app.map_state);

    let detail = match selected {
        Some(p) => tooltip_lines(p),
        None => vec![Line::from(" No registry selected")],
    };

    let tooltip = Paragraph::new(detail).block(
        Block::default()
            .borders(Borders::ALL)
            .border_style(Style::default().fg(Color::Green))
            .title(" Details "),
    );
    f.render_widget(tooltip, right[1]);
}

/// Hover rows from the map layer, plus the raw position
fn tooltip_lines(point: &MapPoint) -> Vec<Line<'static>> {
    let label_style = Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD);
    point
        .tooltip
        .iter()
        .map(|row| {
            Line::from(vec![
                Span::styled(format!(" {}: ", row.label), label_style),
                Span::raw(row.value.clone()),
            ])
        })
        .chain(std::iter::once(Line::from(vec![
            Span::styled(" Position: ", label_style),
            Span::raw(format!("{:.5}, {:.5}", point.latitude, point.longitude)),
        ])))
        .collect()
}

fn truncate(s: &str, max_len: usize) -> String {
    if s.chars().count() <= max_len {
        s.to_string()
    } else {
        let head: String = s.chars().take(max_len - 3).collect();
        format!("{}...", head)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use registry_dashboard::{DashboardConfig, Dataset, RegistryRecord};

    fn app() -> App {
        let records = (0..3)
            .map(|i| RegistryRecord {
                business_name: Some(format!("Shop {}", i)),
                latitude: Some(42.3 + i as f64 * 0.01),
                longitude: Some(-71.1),
                license_status: Some("Active".to_string()),
                license_category: Some("Retail".to_string()),
                equity_program_designation: Some(if i == 0 { "Y" } else { "N" }.to_string()),
                ..Default::default()
            })
            .collect();
        App::new(SessionContext::new(Dataset::from_records(records), DashboardConfig::default()))
    }

    #[test]
    fn test_page_cycle() {
        let mut page = Page::Categories;
        for _ in 0..4 {
            page = page.next();
        }
        assert_eq!(page, Page::Categories);
        assert_eq!(Page::Categories.previous(), Page::Map);
    }

    #[test]
    fn test_category_keys_refresh_view() {
        let mut app = app();
        assert_eq!(app.view.selection.selected_category(), LicenseCategory::Retail);

        app.next_category();
        assert_eq!(app.view.selection.selected_category(), LicenseCategory::Cultivate);
        let pie = app.view.category_pie.ready().unwrap();
        assert_eq!(pie.emphasized().unwrap().label, "Cultivate");
    }

    #[test]
    fn test_status_keys_refresh_summary() {
        let mut app = app();
        app.next_status();
        assert_eq!(app.view.selection.selected_status(), LicenseStatus::Active);
        assert!(app.view.status_summary.starts_with("There are 3"));
    }

    #[test]
    fn test_map_navigation_wraps() {
        let mut app = app();
        assert_eq!(app.map_state.selected(), Some(0));
        app.previous_point();
        assert_eq!(app.map_state.selected(), Some(2));
        app.next_point();
        assert_eq!(app.map_state.selected(), Some(0));
    }

    #[test]
    fn test_detail_panel_uses_layer_tooltip() {
        let app = app();
        let layer = app.view.map.ready().unwrap();
        let lines = tooltip_lines(&layer.points[1]);
        let text: Vec<String> = lines
            .iter()
            .map(|l| l.spans.iter().map(|s| s.content.as_ref()).collect())
            .collect();

        assert_eq!(text.len(), 4);
        assert_eq!(text[0], " Registry Name: Shop 1");
        assert_eq!(text[1], " Registry Address: Unknown");
        assert!(text[3].starts_with(" Position: 42.31000"));
    }

    #[test]
    fn test_header_shows_dataset_origin() {
        let app = app();
        let line = dataset_line(&app.view);
        let text: String = line.spans.iter().map(|s| s.content.as_ref()).collect();

        assert!(text.starts_with("(in memory)"));
        assert!(text.contains("loaded "));
        assert!(text.contains(" UTC"));
        assert!(text.contains("sha256 "));
    }

    #[test]
    fn test_truncate() {
        assert_eq!(truncate("short", 10), "short");
        assert_eq!(truncate("a much longer registry name", 10), "a much ...");
    }
}
