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

//! Expansion of `$(NAME)` environment references in store paths.

use std::collections::HashMap;

use super::error::Error;

/// How many substitutions a single path may go through before it is
/// considered self-referential.
pub const MAX_EXPANSION_ROUNDS: usize = 16;

/// Source of environment variables.
pub trait Environment {
    fn var(&self, name: &str) -> Option<String>;

    /// The account name to use for remote stores that don't name one.
    fn login_name(&self) -> Option<String> {
        self.var("USER").filter(|user| !user.is_empty())
    }
}

/// The environment of the current process.
#[derive(Clone, Copy, Debug, Default)]
pub struct ProcessEnvironment;

impl Environment for ProcessEnvironment {
    fn var(&self, name: &str) -> Option<String> {
        // Names containing `=` or NUL make `var_os` panic on some platforms;
        // no such variable can exist anyway.
        if name.is_empty() || name.contains('=') || name.contains('\0') {
            return None;
        }

        std::env::var_os(name).map(|v| v.to_string_lossy().into_owned())
    }

    fn login_name(&self) -> Option<String> {
        self.var("USER").filter(|user| !user.is_empty()).or_else(|| {
            nix::unistd::User::from_uid(nix::unistd::getuid())
                .ok()
                .flatten()
                .map(|user| user.name)
        })
    }
}

impl Environment for HashMap<String, String> {
    fn var(&self, name: &str) -> Option<String> {
        self.get(name).cloned()
    }
}

/// Replace every `$(NAME)` in `path` with the value of `NAME`, or with
/// nothing if `NAME` is unset.
///
/// Substituted values are themselves subject to expansion. The delimiters
/// are simply the first `$(` and the first `)` after it, so nested
/// references do not nest. A `$(` without a closing `)` is left as is.
pub fn expand(path: &str, env: &dyn Environment) -> Result<String, Error> {
    let mut current = path.to_owned();

    for round in 0..=MAX_EXPANSION_ROUNDS {
        let start = match current.find("$(") {
            Some(start) => start,
            None => return Ok(current),
        };

        let name_start = start + 2;
        let end = match current[name_start..].find(')') {
            Some(end) => name_start + end,
            None => return Ok(current),
        };

        if MAX_EXPANSION_ROUNDS == round {
            break;
        }

        let value = env.var(&current[name_start..end]).unwrap_or_default();
        current = format!("{}{}{}", &current[..start], value, &current[end + 1..]);
    }

    Err(Error::MalformedPath(path.to_owned()))
}

#[cfg(test)]
mod test {
    use proptest::prelude::*;

    use super::*;

    fn env(pairs: &[(&str, &str)]) -> HashMap<String, String> {
        pairs
            .iter()
            .map(|&(k, v)| (k.to_owned(), v.to_owned()))
            .collect()
    }

    #[test]
    fn simple_substitution() {
        assert_eq!(
            "/home/alice/mail",
            expand("/home/$(USER)/mail", &env(&[("USER", "alice")])).unwrap()
        );
        assert_eq!(
            "/home//mail",
            expand("/home/$(USER)/mail", &env(&[])).unwrap()
        );
        assert_eq!(
            "/var/mail/alice",
            expand("/var/mail/alice", &env(&[])).unwrap()
        );
    }

    #[test]
    fn multiple_and_recursive_references() {
        let e = env(&[
            ("HOME", "/home/bob"),
            ("USER", "bob"),
            ("MAILDIR", "$(HOME)/Maildir"),
        ]);

        assert_eq!(
            "/home/bob/Maildir/bob",
            expand("$(MAILDIR)/$(USER)", &e).unwrap()
        );
    }

    #[test]
    fn unterminated_reference_is_left_alone() {
        let e = env(&[("USER", "carol")]);
        assert_eq!("/var/mail/$(USER", expand("/var/mail/$(USER", &e).unwrap());
        assert_eq!(
            "/carol/$(oops",
            expand("/$(USER)/$(oops", &e).unwrap()
        );
    }

    #[test]
    fn nested_references_use_first_closing_paren() {
        let e = env(&[("B", "bee")]);
        // The variable name is `A$(B`, which is unset; the stray `)` stays.
        assert_eq!("x)y", expand("x$(A$(B))y", &e).unwrap());
    }

    #[test]
    fn self_reference_is_bounded() {
        let e = env(&[("LOOP", "$(LOOP)")]);
        assert_matches!(
            Err(Error::MalformedPath(_)),
            expand("/$(LOOP)", &e)
        );

        let e = env(&[("GROW", "a$(GROW)")]);
        assert_matches!(
            Err(Error::MalformedPath(_)),
            expand("$(GROW)", &e)
        );
    }

    #[test]
    fn exactly_max_rounds_is_accepted() {
        let mut pairs = Vec::new();
        for i in 0..MAX_EXPANSION_ROUNDS - 1 {
            pairs.push((format!("V{}", i), format!("$(V{})", i + 1)));
        }
        pairs.push((
            format!("V{}", MAX_EXPANSION_ROUNDS - 1),
            "done".to_owned(),
        ));
        let e: HashMap<String, String> = pairs.into_iter().collect();

        assert_eq!("/done", expand("/$(V0)", &e).unwrap());
    }

    proptest! {
        #[test]
        fn expansion_always_terminates(
            path in "[a-z/$()]{0,24}",
            value in "[a-z/$()]{0,8}",
        ) {
            let e = env(&[("a", value.as_str()), ("b", "$(a)")]);
            match expand(&path, &e) {
                Ok(expanded) => {
                    if let Some(start) = expanded.find("$(") {
                        prop_assert!(!expanded[start..].contains(')'));
                    }
                }
                Err(Error::MalformedPath(p)) => prop_assert_eq!(path, p),
                Err(e) => panic!("Unexpected error: {}", e),
            }
        }
    }
}
