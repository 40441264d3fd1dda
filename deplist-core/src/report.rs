// deplist-core/src/report.rs
//! Writes the ninja deplist listing:
//!
//! ```text
//! bar.o: bar.c foo.h
//! ```

use std::io::{self, Write};

use crate::ledger::Snapshot;

/// Writes one rule per package, ordered by package identifier.
pub fn write_rules<W: Write>(snapshot: &Snapshot, out: &mut W) -> io::Result<()> {
    for rule in snapshot.values() {
        write!(out, "{}:", rule.output.display())?;
        for file in &rule.files {
            write!(out, " {}", file.display())?;
        }
        out.write_all(b"\n")?;
    }
    Ok(())
}

pub fn render_rules(snapshot: &Snapshot) -> String {
    let mut buf = Vec::new();
    // Writing into a Vec cannot fail.
    let _ = write_rules(snapshot, &mut buf);
    String::from_utf8_lossy(&buf).into_owned()
}
