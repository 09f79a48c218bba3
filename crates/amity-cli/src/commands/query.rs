//! Derived-set and listing commands

use clap::Args;
use serde_json::json;

use crate::output::{friendships_table, page_footer, refs_list, to_json, OutputFormat};
use crate::{AppContext, Cli};
use amity_core::{Direction, FriendableRef, FriendshipStatus, PaginatedResults, Pagination};
use amity_engine::RequestFilter;

#[derive(Args, Clone, Copy)]
pub struct PageArgs {
    /// Page number (0-indexed)
    #[arg(long, default_value = "0")]
    pub page: usize,
    /// Results per page (0 = all)
    #[arg(long, default_value = "0")]
    pub per_page: usize,
}

impl PageArgs {
    fn pagination(&self) -> anyhow::Result<Pagination> {
        amity_core::limits::validate_per_page(self.per_page)?;
        Ok(Pagination::new(self.page, self.per_page))
    }
}

#[derive(Args)]
pub struct FriendsArgs {
    pub entity: String,
    /// Only friends in this group
    #[arg(short, long)]
    pub group: Option<String>,
    #[command(flatten)]
    pub paging: PageArgs,
}

#[derive(Args)]
pub struct EntityPageArgs {
    pub entity: String,
    #[command(flatten)]
    pub paging: PageArgs,
}

#[derive(Args)]
pub struct MutualArgs {
    pub entity: String,
    pub other: String,
    /// Print only the number of mutual friends
    #[arg(long)]
    pub count: bool,
    #[command(flatten)]
    pub paging: PageArgs,
}

#[derive(Args)]
pub struct RequestsArgs {
    pub entity: String,
    /// pending, accepted, denied or blocked
    #[arg(short, long)]
    pub status: Option<FriendshipStatus>,
    /// incoming, outgoing or both
    #[arg(long, default_value = "both")]
    pub direction: Direction,
    /// Only edges ENTITY tagged with this group
    #[arg(short, long)]
    pub group: Option<String>,
    #[command(flatten)]
    pub paging: PageArgs,
}

#[derive(Args)]
pub struct CountArgs {
    pub entity: String,
}

fn print_refs(
    cli: &Cli,
    heading: String,
    results: &PaginatedResults<FriendableRef>,
) -> anyhow::Result<()> {
    match cli.output_format() {
        OutputFormat::Json => println!("{}", to_json(results)?),
        OutputFormat::Table => {
            if results.data.is_empty() {
                println!("{}: none", heading);
                return Ok(());
            }
            println!("{} ({}):", heading, results.pagination.total_count);
            println!("{}", refs_list(&results.data));
            if let Some(footer) = page_footer(&results.pagination) {
                println!("{}", footer);
            }
        }
    }
    Ok(())
}

pub async fn friends(args: &FriendsArgs, cli: &Cli, ctx: &AppContext) -> anyhow::Result<()> {
    let entity = ctx.entity(cli, &args.entity)?;
    let results = ctx
        .engine
        .get_friends_page(&entity, args.group.as_deref(), args.paging.pagination()?)
        .await?;

    let heading = match &args.group {
        Some(group) => format!("Friends of {} in {}", entity, group),
        None => format!("Friends of {}", entity),
    };
    print_refs(cli, heading, &results)
}

pub async fn friends_of_friends(args: &EntityPageArgs, cli: &Cli, ctx: &AppContext) -> anyhow::Result<()> {
    let entity = ctx.entity(cli, &args.entity)?;
    let results = ctx
        .engine
        .get_friends_of_friends_page(&entity, args.paging.pagination()?)
        .await?;
    print_refs(cli, format!("Friends of friends of {}", entity), &results)
}

pub async fn mutual(args: &MutualArgs, cli: &Cli, ctx: &AppContext) -> anyhow::Result<()> {
    let entity = ctx.entity(cli, &args.entity)?;
    let other = ctx.entity(cli, &args.other)?;

    if args.count {
        let count = ctx.engine.get_mutual_friends_count(&entity, &other).await?;
        match cli.output_format() {
            OutputFormat::Json => println!("{}", to_json(&json!({ "count": count }))?),
            OutputFormat::Table => println!("{}", count),
        }
        return Ok(());
    }

    let results = ctx
        .engine
        .get_mutual_friends_page(&entity, &other, args.paging.pagination()?)
        .await?;
    print_refs(cli, format!("Mutual friends of {} and {}", entity, other), &results)
}

pub async fn requests(args: &RequestsArgs, cli: &Cli, ctx: &AppContext) -> anyhow::Result<()> {
    let entity = ctx.entity(cli, &args.entity)?;

    let mut filter = RequestFilter::new()
        .direction(args.direction)
        .paginate(args.paging.pagination()?);
    if let Some(status) = args.status {
        filter = filter.status(status);
    }
    if let Some(group) = &args.group {
        filter = filter.group(group.clone());
    }

    let results = ctx.engine.requests(&entity, &filter).await?;
    tracing::info!("Found {} friendships", results.pagination.total_count);

    match cli.output_format() {
        OutputFormat::Json => println!("{}", to_json(&results)?),
        OutputFormat::Table => {
            if results.data.is_empty() {
                println!("No friendships found for {}", entity);
            } else {
                println!("{}", friendships_table(&results.data));
                if let Some(footer) = page_footer(&results.pagination) {
                    println!("{}", footer);
                }
            }
        }
    }
    Ok(())
}

pub async fn count(args: &CountArgs, cli: &Cli, ctx: &AppContext) -> anyhow::Result<()> {
    let entity = ctx.entity(cli, &args.entity)?;
    let count = ctx.engine.get_friends_count(&entity).await?;

    match cli.output_format() {
        OutputFormat::Json => println!("{}", to_json(&json!({ "entity": entity, "friends": count }))?),
        OutputFormat::Table => println!("{}", count),
    }
    Ok(())
}
