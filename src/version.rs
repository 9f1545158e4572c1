//! Tool and corpus version reporting.

use std::collections::HashMap;

use crate::corpus::Corpus;
use crate::models::VersionInfo;

fn from_meta(meta: impl Fn(&str) -> Option<String>) -> VersionInfo {
    VersionInfo {
        tool_version: env!("CARGO_PKG_VERSION").to_string(),
        dataset: meta("dataset"),
        repo_url: meta("repo"),
        released: meta("released"),
        app_name: meta("app"),
    }
}

pub fn version_info(corpus: &Corpus) -> VersionInfo {
    from_meta(|key| corpus.meta(key).map(str::to_string))
}

/// Version info from a stored `meta` table, without loading the corpus
pub fn version_info_from_meta(meta: &HashMap<String, String>) -> VersionInfo {
    from_meta(|key| meta.get(key).cloned())
}

/// Version info of the tool alone, with no corpus loaded
pub fn tool_version_info() -> VersionInfo {
    VersionInfo {
        tool_version: env!("CARGO_PKG_VERSION").to_string(),
        ..Default::default()
    }
}

pub fn format_version(info: &VersionInfo) -> String {
    let fields = [
        ("tftools", Some(info.tool_version.as_str())),
        ("dataset", info.dataset.as_deref()),
        ("repo_url", info.repo_url.as_deref()),
        ("released", info.released.as_deref()),
        ("app_name", info.app_name.as_deref()),
    ];
    fields
        .iter()
        .map(|(name, value)| format!("{:>12}: {}", name, value.unwrap_or("None")))
        .collect::<Vec<_>>()
        .join("\n")
}

pub fn print_version(info: &VersionInfo) {
    println!("{}", format_version(info));
}
