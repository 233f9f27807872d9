//! Then steps for reviewer assignment BDD scenarios.

use super::world::{ReviewWorld, run_async};
use eyre::{WrapErr, eyre};
use rstest_bdd_macros::then;

#[then(r#"pull request "{id}" has {count:usize} reviewers"#)]
fn reviewer_count(world: &ReviewWorld, id: String, count: usize) -> Result<(), eyre::Report> {
    let reviewers = run_async(world.reviews.reviewers(&id)).wrap_err("load reviewers")?;
    if reviewers.len() != count {
        return Err(eyre!(
            "expected {count} reviewers on {id}, found {}",
            reviewers.len()
        ));
    }
    Ok(())
}

#[then(r#""{user}" does not review pull request "{id}""#)]
fn user_is_not_reviewer(world: &ReviewWorld, user: String, id: String) -> Result<(), eyre::Report> {
    let reviewers = run_async(world.reviews.reviewers(&id)).wrap_err("load reviewers")?;
    if reviewers.iter().any(|reviewer| reviewer.as_str() == user) {
        return Err(eyre!("{user} unexpectedly reviews {id}"));
    }
    Ok(())
}

#[then("both merges report the same merge time")]
fn merges_agree(world: &ReviewWorld) -> Result<(), eyre::Report> {
    let [first, second] = world.merges.as_slice() else {
        return Err(eyre!("expected two merges, found {}", world.merges.len()));
    };
    if first.merged_at().is_none() || first.merged_at() != second.merged_at() {
        return Err(eyre!(
            "merge times differ: {:?} vs {:?}",
            first.merged_at(),
            second.merged_at()
        ));
    }
    Ok(())
}

#[then(r#"the request fails with code "{code}""#)]
fn request_fails_with(world: &ReviewWorld, code: String) -> Result<(), eyre::Report> {
    let result = world
        .last_result
        .as_ref()
        .ok_or_else(|| eyre!("missing request result"))?;
    match result {
        Err(err) if err.code().as_str() == code => Ok(()),
        Err(err) => Err(eyre!("expected {code}, got {} ({err})", err.code())),
        Ok(()) => Err(eyre!("expected {code}, but the request succeeded")),
    }
}

#[then("the request succeeds")]
fn request_succeeds(world: &ReviewWorld) -> Result<(), eyre::Report> {
    match world.last_result.as_ref() {
        Some(Ok(())) => Ok(()),
        Some(Err(err)) => Err(eyre!("request failed: {err}")),
        None => Err(eyre!("missing request result")),
    }
}
