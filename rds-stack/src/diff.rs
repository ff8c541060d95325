//! Drift detection between two synthesized templates

use crate::template::Template;
use std::collections::{BTreeMap, BTreeSet};
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChangeKind {
    Added,
    Removed,
    Modified,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Section {
    Resource,
    Output,
    Header,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Change {
    pub section: Section,
    pub kind: ChangeKind,
    pub logical_id: String,
}

impl fmt::Display for Change {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let marker = match self.kind {
            ChangeKind::Added => "+",
            ChangeKind::Removed => "-",
            ChangeKind::Modified => "~",
        };
        let section = match self.section {
            Section::Resource => "resource",
            Section::Output => "output",
            Section::Header => "template",
        };
        write!(f, "{} {} {}", marker, section, self.logical_id)
    }
}

fn diff_maps<V: PartialEq>(
    section: Section,
    previous: &BTreeMap<String, V>,
    next: &BTreeMap<String, V>,
    changes: &mut Vec<Change>,
) {
    let ids: BTreeSet<&String> = previous.keys().chain(next.keys()).collect();
    for id in ids {
        let kind = match (previous.get(id), next.get(id)) {
            (None, Some(_)) => ChangeKind::Added,
            (Some(_), None) => ChangeKind::Removed,
            (Some(a), Some(b)) if a != b => ChangeKind::Modified,
            _ => continue,
        };
        changes.push(Change {
            section,
            kind,
            logical_id: id.clone(),
        });
    }
}

/// Everything that differs between `previous` and `next`.
///
/// An empty result means re-synthesis produced no drift.
pub fn diff(previous: &Template, next: &Template) -> Vec<Change> {
    let mut changes = Vec::new();

    let header = [
        ("AWSTemplateFormatVersion", previous.format_version != next.format_version),
        ("Description", previous.description != next.description),
    ];
    for (field, differs) in header {
        if differs {
            changes.push(Change {
                section: Section::Header,
                kind: ChangeKind::Modified,
                logical_id: field.to_string(),
            });
        }
    }

    diff_maps(Section::Resource, &previous.resources, &next.resources, &mut changes);
    diff_maps(Section::Output, &previous.outputs, &next.outputs, &mut changes);
    changes
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::template::Resource;
    use serde_json::json;

    fn template() -> Template {
        let mut t = Template::new("test");
        t.add_resource("A", Resource::new("T", "S/A/Resource").property("X", json!(1)));
        t.add_resource("B", Resource::new("T", "S/B/Resource"));
        t
    }

    #[test]
    fn test_identical_templates_have_no_changes() {
        assert!(diff(&template(), &template()).is_empty());
    }

    #[test]
    fn test_detects_added_removed_modified() {
        let previous = template();
        let mut next = template();
        next.resources.remove("B");
        next.add_resource("C", Resource::new("T", "S/C/Resource"));
        next.add_resource("A", Resource::new("T", "S/A/Resource").property("X", json!(2)));

        let changes: Vec<String> = diff(&previous, &next).iter().map(|c| c.to_string()).collect();
        assert_eq!(
            changes,
            vec!["~ resource A", "- resource B", "+ resource C"]
        );
    }

    #[test]
    fn test_description_change() {
        let mut next = template();
        next.description = Some("other".to_string());
        let changes = diff(&template(), &next);
        assert_eq!(changes.len(), 1);
        assert_eq!(changes[0].section, Section::Header);
        assert_eq!(changes[0].logical_id, "Description");
    }

    #[test]
    fn test_format_version_change_is_its_own_entry() {
        let mut next = template();
        next.format_version = "2099-01-01".to_string();
        let changes: Vec<String> = diff(&template(), &next).iter().map(|c| c.to_string()).collect();
        assert_eq!(changes, vec!["~ template AWSTemplateFormatVersion"]);

        next.description = Some("other".to_string());
        assert_eq!(diff(&template(), &next).len(), 2);
    }
}
