//-
// Copyright (c) 2026, the Mailcheck authors
//
// This file is part of Mailcheck.
//
// Mailcheck is free software: you can redistribute it and/or modify it under
// the terms of the GNU General Public License as published by the Free
// Software Foundation, either version 3 of the License, or (at your option)
// any later version.
//
// Mailcheck is distributed in the hope that it will be useful, but WITHOUT
// ANY WARRANTY; without even the implied warranty of MERCHANTABILITY or
// FITNESS FOR A PARTICULAR PURPOSE. See the GNU General Public License for
// more details.
//
// You should have received a copy of the GNU General Public License along
// with Mailcheck. If not, see <http://www.gnu.org/licenses/>.

use crate::store::dispatch::StoreReport;
use crate::store::StoreKind;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Style {
    /// Counts of new, unread and saved messages.
    Full,
    /// Just which stores have new mail.
    Brief,
}

/// The line to show the user for `report`, if any.
///
/// Failed stores produce nothing here; their diagnostics have already been
/// logged.
pub fn describe(report: &StoreReport, style: Style) -> Option<String> {
    let counts = report.outcome.as_ref().ok()?;

    if Style::Brief == style {
        return if counts.has_mail() {
            Some(format!("You have new mail in {}", report.store))
        } else {
            None
        };
    }

    let mut parts = Vec::new();
    if counts.new > 0 {
        parts.push(format!("{} new", counts.new));
    }
    // IMAP unread messages are the same ones already counted as new.
    if counts.unread > 0 && StoreKind::Imap != report.kind {
        parts.push(format!("{} unread", counts.unread));
    }
    if counts.read > 0 {
        parts.push(format!("{} saved", counts.read));
    }

    if parts.is_empty() {
        return None;
    }

    Some(format!(
        "You have {} messages in {}",
        join(&parts),
        report.store
    ))
}

fn join(parts: &[String]) -> String {
    match parts.split_last() {
        None => String::new(),
        Some((last, [])) => last.clone(),
        Some((last, init)) => format!("{} and {}", init.join(", "), last),
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::store::InspectionResult;
    use crate::support::error::Error;

    fn report(
        kind: StoreKind,
        new: usize,
        read: usize,
        unread: usize,
    ) -> StoreReport {
        StoreReport {
            store: "/var/mail/alice".to_owned(),
            kind,
            outcome: Ok(InspectionResult { new, read, unread }),
        }
    }

    fn full(report: StoreReport) -> Option<String> {
        describe(&report, Style::Full)
    }

    #[test]
    fn full_descriptions() {
        assert_eq!(
            Some("You have 3 new messages in /var/mail/alice".to_owned()),
            full(report(StoreKind::Mbox, 3, 0, 0))
        );
        assert_eq!(
            Some(
                "You have 3 new and 2 saved messages in /var/mail/alice"
                    .to_owned()
            ),
            full(report(StoreKind::Maildir, 3, 2, 0))
        );
        assert_eq!(
            Some(
                "You have 3 new, 1 unread and 2 saved messages in \
                 /var/mail/alice"
                    .to_owned()
            ),
            full(report(StoreKind::Mbox, 3, 2, 1))
        );
        assert_eq!(
            Some("You have 2 saved messages in /var/mail/alice".to_owned()),
            full(report(StoreKind::Pop3, 0, 2, 0))
        );
        assert_eq!(None, full(report(StoreKind::Mbox, 0, 0, 0)));
    }

    #[test]
    fn imap_unread_is_not_repeated() {
        assert_eq!(
            Some(
                "You have 4 new and 8 saved messages in /var/mail/alice"
                    .to_owned()
            ),
            full(report(StoreKind::Imap, 4, 8, 4))
        );
    }

    #[test]
    fn brief_descriptions() {
        assert_eq!(
            Some("You have new mail in /var/mail/alice".to_owned()),
            describe(&report(StoreKind::Mbox, 0, 5, 1), Style::Brief)
        );
        assert_eq!(
            None,
            describe(&report(StoreKind::Mbox, 0, 5, 0), Style::Brief)
        );
    }

    #[test]
    fn failures_are_silent() {
        let report = StoreReport {
            store: "/nowhere".to_owned(),
            kind: StoreKind::Invalid,
            outcome: Err(Error::NoSuchStore("/nowhere".to_owned())),
        };
        assert_eq!(None, describe(&report, Style::Full));
        assert_eq!(None, describe(&report, Style::Brief));
    }
}
