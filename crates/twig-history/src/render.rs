//! Human-readable log output in the style of `git log`.

use colored::Colorize;
use serde::Serialize;
use twig_store::commit::AUTHOR;
use twig_store::ObjectStore;
use twig_types::ObjectId;

use crate::ancestry::History;
use crate::error::{HistoryError, HistoryResult};
use crate::signature::Signature;

/// Presentation switches for [`History::render_log`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RenderOptions {
    /// Paint the `commit <hash>` line yellow.
    pub color: bool,
}

impl RenderOptions {
    pub fn colored() -> Self {
        Self { color: true }
    }
}

/// The parts of a commit shown in a log.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LogEntry {
    pub id: ObjectId,
    pub parents: Vec<ObjectId>,
    pub author: Signature,
    pub date: String,
    pub message: String,
}

impl LogEntry {
    /// Render one commit block without a trailing newline.
    pub fn render(&self, options: RenderOptions) -> String {
        let header = format!("commit {}", self.id);
        let mut lines = vec![if options.color {
            header.yellow().to_string()
        } else {
            header
        }];

        if self.parents.len() > 1 {
            let short: Vec<String> = self.parents.iter().map(ObjectId::short_hex).collect();
            lines.push(format!("Merge: {}", short.join(" ")));
        }
        lines.push(format!("Author: {}", self.author.name));
        lines.push(format!("Date:   {}", self.date));
        lines.push(String::new());
        lines.push(format!("    {}", self.message));
        lines.join("\n")
    }
}

impl<'a, S: ObjectStore + ?Sized> History<'a, S> {
    /// Load the log fields of one commit.
    pub fn entry(&self, id: &ObjectId) -> HistoryResult<LogEntry> {
        let commit = self.store().read_commit(id)?;

        let raw = commit.get(AUTHOR).ok_or(HistoryError::MissingField {
            id: *id,
            field: AUTHOR,
        })?;
        let author = raw
            .first()
            .parse::<Signature>()
            .map_err(|e| HistoryError::MalformedField {
                id: *id,
                field: AUTHOR,
                reason: e.to_string(),
            })?;
        let parents = commit.parents().map_err(|e| HistoryError::MalformedField {
            id: *id,
            field: "parent",
            reason: e.to_string(),
        })?;

        Ok(LogEntry {
            id: *id,
            parents,
            date: author.display_date(),
            author,
            message: commit.short_msg().unwrap_or_default().to_string(),
        })
    }

    /// Load the log fields of every commit in `ids`, in order.
    pub fn entries(&self, ids: &[ObjectId]) -> HistoryResult<Vec<LogEntry>> {
        ids.iter().map(|id| self.entry(id)).collect()
    }

    /// Render `ids` as a log, one block per commit separated by blank lines.
    pub fn render_log(&self, ids: &[ObjectId], options: RenderOptions) -> HistoryResult<String> {
        let blocks: Vec<String> = self
            .entries(ids)?
            .iter()
            .map(|entry| entry.render(options))
            .collect();
        Ok(blocks.join("\n\n").trim_end().to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ancestry::tests::{commit, seven_commit_history};
    use twig_store::{Commit, InMemoryObjectStore};

    #[test]
    fn render_single_commit() {
        let store = InMemoryObjectStore::new();
        let c = seven_commit_history(&store);
        let history = History::new(&store);

        let out = history.render_log(&c[..1], RenderOptions::default()).unwrap();
        assert_eq!(
            out,
            "commit d228dfd0601080af1af564eb7a3bc6fbb7a2696f\n\
             Author: Kevin J. Dugan <dugankj@ornl.gov>\n\
             Date:   Sun Jun 9 12:39:40 2019 -0400\n\
             \n\
             \x20   Initial Commit"
        );
    }

    #[test]
    fn render_merge_shows_short_parents() {
        let store = InMemoryObjectStore::new();
        let c = seven_commit_history(&store);
        let history = History::new(&store);

        let out = history.render_log(&[c[6], c[5]], RenderOptions::default()).unwrap();
        let expected = [
            "commit 075c7e021c0d2e4a43f01a2e848daf605ed4e65f",
            "Author: Kevin J. Dugan <dugankj@ornl.gov>",
            "Date:   Sun Jun 9 12:47:54 2019 -0400",
            "",
            "    added new lines",
            "",
            "commit af54843b4fa85db56ed9140b5a39ec2df744fc4b",
            "Merge: bbfbe57 17c06af",
            "Author: Kevin J. Dugan <dugankj@ornl.gov>",
            "Date:   Sun Jun 9 12:46:57 2019 -0400",
            "",
            "    Merge branch 'new-file'",
        ]
        .join("\n");
        assert_eq!(out, expected);
    }

    #[test]
    fn render_full_log() {
        let store = InMemoryObjectStore::new();
        let c = seven_commit_history(&store);
        let history = History::new(&store);

        let out = history
            .render_log(&history.log(c[6]).unwrap(), RenderOptions::default())
            .unwrap();
        assert_eq!(out.matches("commit ").count(), 7);
        assert_eq!(out.matches("Merge: ").count(), 1);
        assert!(!out.ends_with('\n'));
        assert!(out.ends_with("    Initial Commit"));
    }

    #[test]
    fn color_paints_header_only() {
        colored::control::set_override(true);
        let store = InMemoryObjectStore::new();
        let c = seven_commit_history(&store);
        let out = History::new(&store)
            .render_log(&c[..1], RenderOptions::colored())
            .unwrap();
        assert!(out.starts_with("\u{1b}[33mcommit d228dfd"));
        assert!(out.contains("\nAuthor: Kevin"));
    }

    #[test]
    fn empty_log_renders_empty() {
        let store = InMemoryObjectStore::new();
        let out = History::new(&store)
            .render_log(&[], RenderOptions::default())
            .unwrap();
        assert_eq!(out, "");
    }

    #[test]
    fn missing_author() {
        let store = InMemoryObjectStore::new();
        let c = Commit::new().with("tree", "t").with_message("anonymous", None);
        let id = store.write(&c.to_stored_object()).unwrap();
        let err = History::new(&store)
            .render_log(&[id], RenderOptions::default())
            .unwrap_err();
        assert!(matches!(err, HistoryError::MissingField { field: "author", .. }));
    }

    #[test]
    fn malformed_author() {
        let store = InMemoryObjectStore::new();
        let c = Commit::new()
            .with("tree", "t")
            .with("author", "nobody")
            .with_message("odd", None);
        let id = store.write(&c.to_stored_object()).unwrap();
        let err = History::new(&store).entry(&id).unwrap_err();
        assert!(matches!(err, HistoryError::MalformedField { field: "author", .. }));
    }

    #[test]
    fn missing_message_renders_empty_line() {
        let store = InMemoryObjectStore::new();
        let c = Commit::new().with("author", "A <a@x> 0 +0000");
        let id = store.write(&c.to_stored_object()).unwrap();
        let entry = History::new(&store).entry(&id).unwrap();
        assert_eq!(entry.message, "");
        assert!(entry.render(RenderOptions::default()).ends_with("+0000\n\n    "));
    }

    #[test]
    fn entry_serializes_to_json() {
        let store = InMemoryObjectStore::new();
        let c = seven_commit_history(&store);
        let parent = c[0];
        let child = commit(&store, "t", &[parent], 1560084040, "child");
        let entry = History::new(&store).entry(&child).unwrap();

        let json = serde_json::to_value(&entry).unwrap();
        assert_eq!(json["parents"][0], parent.to_hex());
        assert_eq!(json["author"]["timestamp"], 1560084040);
        assert_eq!(json["message"], "child");
    }
}
