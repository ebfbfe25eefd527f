//! Manual page rendering for specification trees.
//!
//! Every command level gets its own groff page. Pages are keyed by the
//! parent name joined to the command name with `-` (`app`, `app-status`,
//! `status-show`), which is also the file stem they are written under.

use std::collections::BTreeMap;

use crate::SpecNode;

/// Renders the synopsis line for one command level.
///
/// # Examples
///
/// ```
/// use cmdspec_core::*;
///
/// let mut b = SpecBuilder::new("copy", "Copy files");
/// b.add_flag(FlagDefinition::switch("force").with_short('f'));
/// b.add_positional(PositionalDefinition::new("sources", ValueType::List));
/// assert_eq!(synopsis(&b.build()), "copy [--force | -f] <SOURCES> [SOURCES ...]");
/// ```
pub fn synopsis(spec: &SpecNode) -> String {
    let mut parts = vec![spec.name.clone()];
    for flag in &spec.flags {
        parts.push(format!("[{}]", flag.names().join(" | ")));
    }
    for positional in &spec.positionals {
        let metavar = positional.metavar();
        if positional.variadic {
            parts.push(format!("<{metavar}> [{metavar} ...]"));
        } else {
            parts.push(format!("<{metavar}>"));
        }
    }
    parts.join(" ")
}

fn options(spec: &SpecNode) -> String {
    let mut out = String::new();
    for flag in &spec.flags {
        out.push_str(&format!("{} - {}\n\n", flag.names().join(", "), flag.help));
    }
    for positional in &spec.positionals {
        let metavar = positional.metavar();
        if positional.variadic {
            out.push_str(&format!("{metavar} [{metavar} ...] - {}\n\n", positional.help));
        } else {
            out.push_str(&format!("{metavar} - {}\n\n", positional.help));
        }
    }
    out
}

/// Renders a single groff page for one command level.
pub fn render_page(spec: &SpecNode, section: u8) -> String {
    let mut lines = vec![
        format!(".TH {} {section}", spec.name.to_uppercase()),
        ".SH NAME".to_string(),
        format!("{} \\- {}", spec.name, spec.description),
        ".SH SYNOPSIS".to_string(),
        synopsis(spec),
        ".SH DESCRIPTION".to_string(),
        spec.description.clone(),
        ".SH OPTIONS".to_string(),
        options(spec),
    ];

    if !spec.aliases.is_empty() {
        lines.push(".SH ALIASES".to_string());
        lines.push(spec.aliases.join(", "));
    }

    if !spec.children.is_empty() {
        lines.push(".SH SUBCOMMANDS".to_string());
        for child in &spec.children {
            lines.push(format!("{} - {}\n", child.name, child.description));
        }
    }

    lines.join("\n")
}

/// Renders pages for a node and every descendant.
///
/// # Examples
///
/// ```
/// use cmdspec_core::*;
///
/// let mut status = SpecBuilder::new("status", "Show status");
/// status.add_child(SpecBuilder::new("show", "Show it"));
/// let mut root = SpecBuilder::new("app", "Demo application");
/// root.add_child(status);
///
/// let pages = render_manpages(&root.build(), 1);
/// let names: Vec<_> = pages.keys().map(String::as_str).collect();
/// assert_eq!(names, vec!["app", "app-status", "status-show"]);
/// assert!(pages["app"].starts_with(".TH APP 1"));
/// ```
pub fn render_manpages(spec: &SpecNode, section: u8) -> BTreeMap<String, String> {
    let mut pages = BTreeMap::new();
    pages.insert(spec.name.clone(), render_page(spec, section));
    collect_children(spec, section, &mut pages);
    pages
}

fn collect_children(spec: &SpecNode, section: u8, pages: &mut BTreeMap<String, String>) {
    for child in &spec.children {
        pages.insert(
            format!("{}-{}", spec.name, child.name),
            render_page(child, section),
        );
        collect_children(child, section, pages);
    }
}
