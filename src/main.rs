// Only compile UI module when TUI feature is enabled
#[cfg(feature = "tui")]
mod ui;

use anyhow::{Context, Result};
use std::env;
use tracing::{info, Level};
use tracing_subscriber::FmtSubscriber;

use registry_dashboard::{DashboardConfig, DashboardView, SessionContext, Widget, VERSION};

fn main() -> Result<()> {
    let args: Vec<String> = env::args().collect();
    let summary_mode = args.len() > 1 && args[1] == "summary";

    // The terminal dashboard owns the screen, so keep stderr quiet there
    init_logging(if summary_mode { Level::INFO } else { Level::WARN })?;
    info!("Registry Dashboard v{}", VERSION);

    let config = DashboardConfig::load().context("Failed to load dashboard.toml")?;
    let session = SessionContext::open(config).context("Failed to load registry data")?;

    if summary_mode {
        run_summary(&session);
    } else {
        run_ui_mode(session)?;
    }

    Ok(())
}

fn init_logging(level: Level) -> Result<()> {
    let subscriber = FmtSubscriber::builder()
        .with_max_level(level)
        .with_target(false)
        .with_writer(std::io::stderr)
        .compact()
        .finish();

    tracing::subscriber::set_global_default(subscriber).context("Failed to set tracing subscriber")
}

fn run_summary(session: &SessionContext) {
    let view = session.render();

    println!("🌿 Massachusetts Cannabis Registries");
    println!("━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━");
    for line in describe_dataset(&view) {
        println!("{}", line);
    }

    print_view(&view);
}

fn describe_dataset(view: &DashboardView) -> Vec<String> {
    let info = &view.dataset;
    vec![
        format!(
            "📂 {} registries loaded from {}",
            view.total_records,
            info.source.as_deref().unwrap_or("(in memory)")
        ),
        format!(
            "   loaded {}  sha256 {}",
            info.loaded_at.format("%Y-%m-%d %H:%M:%S UTC"),
            info.short_fingerprint()
        ),
        format!(
            "   session {} started {}",
            view.session_id,
            view.session_started_at.format("%Y-%m-%d %H:%M:%S UTC")
        ),
    ]
}

fn print_view(view: &DashboardView) {
    println!("\n📊 License Categories");
    match &view.category_pie {
        Widget::Ready { data } => {
            for slice in &data.slices {
                let marker = if slice.emphasized { "→" } else { " " };
                println!("  {} {:<12} {:>5}  {:>5.1}%", marker, slice.label, slice.value, slice.fraction * 100.0);
            }
        }
        Widget::Failed { message } => println!("  ❌ {}", message),
    }
    println!("  {}", view.category_summary);

    for (heading, chart) in [("License Status", &view.status_bar), ("Boston Equity Program", &view.equity_bar)] {
        println!("\n📊 {}", heading);
        match chart {
            Widget::Ready { data } => {
                for point in &data.points {
                    println!("  {:<16} {:>5}", point.label, point.value);
                }
            }
            Widget::Failed { message } => println!("  ❌ {}", message),
        }
    }
    println!("  {}", view.status_summary);

    println!("\n🗺️  Map");
    match &view.map {
        Widget::Ready { data } => {
            println!("  {} registries with coordinates", data.points.len());
            if let Some(center) = &data.view {
                println!("  centered at {:.5}, {:.5}", center.latitude, center.longitude);
            }
        }
        Widget::Failed { message } => println!("  ❌ {}", message),
    }
}

#[cfg(feature = "tui")]
fn run_ui_mode(session: SessionContext) -> Result<()> {
    let mut app = ui::App::new(session);
    ui::run_ui(&mut app)?;

    println!("\n✅ Dashboard closed");

    Ok(())
}

#[cfg(not(feature = "tui"))]
fn run_ui_mode(session: SessionContext) -> Result<()> {
    eprintln!("❌ TUI mode not available!");
    eprintln!("   Rebuild with: cargo build --features tui");
    eprintln!("   Or use the text summary: registry-dashboard summary");
    print_view(&session.render());
    std::process::exit(1);
}
