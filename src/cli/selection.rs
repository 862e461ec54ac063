//! Turning push/pull arguments into an environment and a target set

use std::collections::BTreeSet;

use super::args::TransferArgs;
use crate::error::{common, Result};
use crate::transfer::SyncTarget;

/// Word that selects every target
pub const ALL_TARGETS: &str = "all";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Selection {
    pub environment: Option<String>,
    /// Ordered by dispatch order, duplicates collapsed
    pub targets: BTreeSet<SyncTarget>,
}

/// Resolve positional words and flags.
///
/// The first word names the environment when `-e` was not given and
/// `is_environment` recognizes it. Remaining words are target names, `all`,
/// or clusters of target letters such as `tpud`.
pub fn select(args: &TransferArgs, is_environment: impl Fn(&str) -> bool) -> Result<Selection> {
    let mut words = args.words.iter().map(String::as_str).peekable();

    let mut environment = args.env.clone();
    if environment.is_none() {
        if let Some(first) = words.next_if(|word| is_environment(word)) {
            environment = Some(first.to_string());
        }
    }

    let mut targets: BTreeSet<SyncTarget> = args.flagged_targets().into_iter().collect();
    if args.all {
        targets.extend(SyncTarget::ALL);
    }
    for word in words {
        targets.extend(parse_token(word)?);
    }

    Ok(Selection {
        environment,
        targets,
    })
}

/// Expand one positional word into the targets it names
pub fn parse_token(token: &str) -> Result<Vec<SyncTarget>> {
    let token = token.trim_start_matches('-');
    if token == ALL_TARGETS {
        return Ok(SyncTarget::ALL.to_vec());
    }
    if let Some(target) = SyncTarget::from_name(token) {
        return Ok(vec![target]);
    }
    if token.is_empty() {
        return Err(common::unknown_target(token));
    }
    token
        .chars()
        .map(|letter| SyncTarget::from_letter(letter).ok_or_else(|| common::unknown_target(token)))
        .collect()
}
