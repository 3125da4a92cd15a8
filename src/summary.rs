// 📝 Text summaries shown next to the dropdown and the radio group

use crate::aggregate::{LicenseCategoryCounts, StatusCounts};
use crate::registry::{Bucket, LicenseCategory, LicenseStatus};

fn sentence(count: usize, region: &str, qualifier: &str) -> String {
    let article = if starts_with_vowel(qualifier) { "an" } else { "a" };
    if count == 1 {
        format!(
            "There is 1 cannabis registry in {} that has {} {} license.",
            region, article, qualifier
        )
    } else {
        format!(
            "There are {} cannabis registries in {} that have {} licenses.",
            count, region, qualifier
        )
    }
}

fn starts_with_vowel(word: &str) -> bool {
    matches!(word.chars().next(), Some('a' | 'e' | 'i' | 'o' | 'u'))
}

/// "There are 12 cannabis registries in Boston that have active licenses."
pub fn status_summary(counts: &StatusCounts, status: LicenseStatus, region: &str) -> String {
    sentence(counts.get(status), region, &status.label().to_lowercase())
}

/// Same sentence for a license category, looked up by value
pub fn category_summary(counts: &LicenseCategoryCounts, category: LicenseCategory, region: &str) -> String {
    sentence(counts.get(category), region, &category.label().to_lowercase())
}
