//! Friendship lifecycle commands

use clap::Args;
use serde_json::json;

use crate::output::{to_json, OutputFormat};
use crate::{AppContext, Cli};
use amity_core::FriendableRef;

/// Two entities: the acting one and the other side
#[derive(Args)]
pub struct PairArgs {
    /// Acting entity (`type:id`, or a bare id of the default type)
    pub entity: String,
    /// Other entity
    pub other: String,
}

impl PairArgs {
    fn resolve(&self, cli: &Cli, ctx: &AppContext) -> anyhow::Result<(FriendableRef, FriendableRef)> {
        Ok((ctx.entity(cli, &self.entity)?, ctx.entity(cli, &self.other)?))
    }
}

/// Print the outcome of a transition
fn report(cli: &Cli, action: &str, ok: bool, message: String) -> anyhow::Result<()> {
    match cli.output_format() {
        OutputFormat::Json => println!("{}", to_json(&json!({ "action": action, "ok": ok }))?),
        OutputFormat::Table => {
            if !cli.quiet {
                println!("{}", message);
            }
        }
    }
    Ok(())
}

pub async fn befriend(args: &PairArgs, cli: &Cli, ctx: &AppContext) -> anyhow::Result<()> {
    let (entity, other) = args.resolve(cli, ctx)?;

    match ctx.engine.befriend(&entity, &other).await? {
        Some(friendship) => match cli.output_format() {
            OutputFormat::Json => println!("{}", to_json(&friendship)?),
            OutputFormat::Table => {
                if !cli.quiet {
                    println!("Friend request sent: {} -> {}", entity, other);
                }
            }
        },
        None => report(
            cli,
            "befriend",
            false,
            format!("Cannot send a friend request from {} to {}", entity, other),
        )?,
    }
    Ok(())
}

pub async fn accept(args: &PairArgs, cli: &Cli, ctx: &AppContext) -> anyhow::Result<()> {
    let (entity, other) = args.resolve(cli, ctx)?;
    let ok = ctx.engine.accept_friend_request(&entity, &other).await?;
    let message = if ok {
        format!("{} accepted the request from {}", entity, other)
    } else {
        format!("No pending request from {} to {}", other, entity)
    };
    report(cli, "accept", ok, message)
}

pub async fn deny(args: &PairArgs, cli: &Cli, ctx: &AppContext) -> anyhow::Result<()> {
    let (entity, other) = args.resolve(cli, ctx)?;
    let ok = ctx.engine.deny_friend_request(&entity, &other).await?;
    let message = if ok {
        format!("{} denied the request from {}", entity, other)
    } else {
        format!("No pending request from {} to {}", other, entity)
    };
    report(cli, "deny", ok, message)
}

pub async fn block(args: &PairArgs, cli: &Cli, ctx: &AppContext) -> anyhow::Result<()> {
    let (entity, other) = args.resolve(cli, ctx)?;
    let friendship = ctx.engine.block_friend(&entity, &other).await?;
    match cli.output_format() {
        OutputFormat::Json => println!("{}", to_json(&friendship)?),
        OutputFormat::Table => {
            if !cli.quiet {
                println!("{} blocked {}", entity, other);
            }
        }
    }
    Ok(())
}

pub async fn unblock(args: &PairArgs, cli: &Cli, ctx: &AppContext) -> anyhow::Result<()> {
    let (entity, other) = args.resolve(cli, ctx)?;
    let ok = ctx.engine.unblock_friend(&entity, &other).await?;
    let message = if ok {
        format!("{} unblocked {}", entity, other)
    } else {
        format!("{} has not blocked {}", entity, other)
    };
    report(cli, "unblock", ok, message)
}

pub async fn unfriend(args: &PairArgs, cli: &Cli, ctx: &AppContext) -> anyhow::Result<()> {
    let (entity, other) = args.resolve(cli, ctx)?;
    let ok = ctx.engine.unfriend(&entity, &other).await?;
    let message = if ok {
        format!("Removed every friendship between {} and {}", entity, other)
    } else {
        format!("No friendship between {} and {}", entity, other)
    };
    report(cli, "unfriend", ok, message)
}

pub async fn status(args: &PairArgs, cli: &Cli, ctx: &AppContext) -> anyhow::Result<()> {
    let (entity, other) = args.resolve(cli, ctx)?;
    let engine = &ctx.engine;

    let friendship = engine.get_friendship(&entity, &other).await?;
    let is_friend = engine.is_friend_with(&entity, &other).await?;
    let has_blocked = engine.has_blocked(&entity, &other).await?;
    let is_blocked_by = engine.is_blocked_by(&entity, &other).await?;
    let request_from_other = engine.has_friend_request_from(&entity, &other).await?;
    let can_befriend = engine.can_befriend(&entity, &other).await?;
    let groups = engine.groups_for(&entity, &other).await?;

    match cli.output_format() {
        OutputFormat::Json => {
            let value = json!({
                "entity": entity,
                "other": other,
                "friendship": friendship,
                "is_friend": is_friend,
                "has_blocked": has_blocked,
                "is_blocked_by": is_blocked_by,
                "has_friend_request_from": request_from_other,
                "can_befriend": can_befriend,
                "groups": groups,
            });
            println!("{}", to_json(&value)?);
        }
        OutputFormat::Table => {
            println!("{} -> {}", entity, other);
            match &friendship {
                Some(f) => println!(
                    "  status: {} (sent by {}, updated {})",
                    f.status,
                    f.sender,
                    f.updated_at.format("%Y-%m-%d %H:%M:%S")
                ),
                None => println!("  status: none"),
            }
            println!("  friends: {}", is_friend);
            println!("  has blocked: {}", has_blocked);
            println!("  blocked by: {}", is_blocked_by);
            println!("  request from {}: {}", other, request_from_other);
            println!("  can befriend: {}", can_befriend);
            if !groups.is_empty() {
                println!("  groups: {}", groups.join(", "));
            }
        }
    }
    Ok(())
}
