use std::path::Path;

use anyhow::Result;

use crate::commands::fetch_feed;
use crate::render;
use crate::FeedArgs;

pub fn run(feed: &FeedArgs, out: Option<&Path>) -> Result<()> {
    let records = fetch_feed(feed)?;
    let classified = transition_engine::classify(&records)?;
    render::render(&classified, out)
}
