//! Friend group commands

use clap::{Args, Subcommand};
use serde_json::json;

use crate::output::{to_json, OutputFormat, Table};
use crate::{AppContext, Cli};

#[derive(Args)]
pub struct GroupArgs {
    #[command(subcommand)]
    pub command: GroupCommands,
}

#[derive(Subcommand)]
pub enum GroupCommands {
    /// Put a friend in one of ENTITY's groups
    Add {
        /// Entity that owns the group
        entity: String,
        /// Accepted friend to group
        friend: String,
        /// Group slug
        group: String,
    },
    /// Take a friend out of one group, or all groups
    Remove {
        entity: String,
        friend: String,
        /// Group slug (all groups when omitted)
        group: Option<String>,
    },
    /// List configured groups, or the groups ENTITY put FRIEND in
    List {
        #[arg(requires = "friend")]
        entity: Option<String>,
        #[arg(requires = "entity")]
        friend: Option<String>,
    },
}

pub async fn run(args: &GroupArgs, cli: &Cli, ctx: &AppContext) -> anyhow::Result<()> {
    let format = cli.output_format();

    match &args.command {
        GroupCommands::Add { entity, friend, group } => {
            let entity = ctx.entity(cli, entity)?;
            let friend = ctx.entity(cli, friend)?;
            let added = ctx.engine.group_friend(&entity, &friend, group).await?;

            match format {
                OutputFormat::Json => println!("{}", to_json(&json!({ "action": "group", "ok": added }))?),
                OutputFormat::Table if added => println!("Added {} to {}'s {} group", friend, entity, group),
                OutputFormat::Table => {
                    if !ctx.engine.config().groups.contains(group) {
                        println!("Unknown group '{}'", group);
                    } else {
                        println!("{} was not added to {} (not a friend, or already there)", friend, group);
                    }
                }
            }
        }
        GroupCommands::Remove { entity, friend, group } => {
            let entity = ctx.entity(cli, entity)?;
            let friend = ctx.entity(cli, friend)?;
            let removed = ctx
                .engine
                .ungroup_friend(&entity, &friend, group.as_deref())
                .await?;

            match format {
                OutputFormat::Json => println!("{}", to_json(&json!({ "removed": removed }))?),
                OutputFormat::Table => println!("Removed {} group membership(s) of {}", removed, friend),
            }
        }
        GroupCommands::List { entity: Some(entity), friend: Some(friend) } => {
            let entity = ctx.entity(cli, entity)?;
            let friend = ctx.entity(cli, friend)?;
            let groups = ctx.engine.groups_for(&entity, &friend).await?;

            match format {
                OutputFormat::Json => println!("{}", to_json(&groups)?),
                OutputFormat::Table if groups.is_empty() => {
                    println!("{} has not grouped {}", entity, friend)
                }
                OutputFormat::Table => println!("{}", groups.join("\n")),
            }
        }
        GroupCommands::List { .. } => {
            let catalog = &ctx.engine.config().groups;
            match format {
                OutputFormat::Json => println!("{}", to_json(catalog)?),
                OutputFormat::Table => {
                    let mut table = Table::new(vec!["SLUG", "NAME"]);
                    for (slug, name) in catalog.iter() {
                        table.row(vec![slug.to_string(), name.to_string()]);
                    }
                    println!("{}", table.render());
                }
            }
        }
    }

    Ok(())
}
