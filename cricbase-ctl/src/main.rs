use std::{path::PathBuf, sync::Arc, time::Duration};

use anyhow::Context;
use cricbase_client::{
    api::{
        CommentId, DataSource, DeliveryId, DeliveryItem, DeliveryKind, Error, FeedFilter, Match,
        MatchId, MatchStatus, User, Vote,
    },
    CommentTree, DeliveryFeed, LivePoller, WithFallback, LIVE_REFRESH_INTERVAL,
};
use cricbase_mock_server::{MockDump, MockServer};

mod rest;
use rest::RestSource;

#[derive(structopt::StructOpt)]
struct Opt {
    /// Backend base URL
    #[structopt(short, long, env = "CRICBASE_HOST", default_value = "http://localhost:8000")]
    host: String,

    /// Bearer token sent along with comments and votes
    #[structopt(long, env = "CRICBASE_TOKEN", hide_env_values = true)]
    token: Option<String>,

    /// Answer from local data when the backend cannot be reached
    #[structopt(long)]
    offline_fallback: bool,

    /// Local data to fall back to, as generated by generate-test-data
    #[structopt(long, parse(from_os_str))]
    fixtures: Option<PathBuf>,

    #[structopt(subcommand)]
    cmd: Command,
}

#[derive(structopt::StructOpt)]
enum Command {
    /// Latest notable deliveries across all matches
    Feed {
        #[structopt(short, long, default_value = "20")]
        limit: usize,
    },

    /// List matches
    Matches {
        /// live, upcoming or completed
        #[structopt(short, long)]
        status: Option<MatchStatus>,
    },

    /// Show a match and its ball-by-ball commentary
    Match {
        #[structopt(parse(from_str))]
        id: MatchId,

        /// all, sixes, fours, wickets, highlights, overs, firstInning or secondInning
        #[structopt(short, long, default_value = "all")]
        filter: FeedFilter,

        /// Number of pages to load
        #[structopt(short, long, default_value = "1")]
        pages: usize,
    },

    /// Show the comment thread of a delivery
    Comments {
        #[structopt(parse(from_str))]
        delivery: DeliveryId,
    },

    /// Comment on a delivery
    Reply {
        #[structopt(parse(from_str))]
        delivery: DeliveryId,

        content: String,

        /// Comment to reply to, instead of starting a new thread
        #[structopt(short, long, parse(from_str))]
        parent: Option<CommentId>,
    },

    /// Vote on a comment
    Vote {
        #[structopt(parse(from_str))]
        delivery: DeliveryId,

        #[structopt(parse(from_str))]
        comment: CommentId,

        /// up or down
        vote: Vote,
    },

    /// Follow match listings as they change
    Watch {
        #[structopt(short, long)]
        status: Option<MatchStatus>,

        /// Seconds between refreshes
        #[structopt(short, long)]
        period: Option<u64>,

        /// Stop after this many refreshes
        #[structopt(short, long)]
        updates: Option<usize>,
    },

    /// Player and team statistics
    Stats,
}

fn open_source(opt: &Opt) -> anyhow::Result<Arc<dyn DataSource>> {
    let rest = RestSource::new(&opt.host, opt.token.clone());
    let fallback = match (&opt.fixtures, opt.offline_fallback) {
        (Some(path), _) => {
            let data = std::fs::read(path)
                .with_context(|| format!("reading fixtures from {}", path.display()))?;
            let dump: MockDump = serde_json::from_slice(&data)
                .with_context(|| format!("parsing fixtures from {}", path.display()))?;
            Some(MockServer::from_dump(dump))
        }
        (None, true) => Some(MockServer::with_fixtures()),
        (None, false) => None,
    };
    let source: Arc<dyn DataSource> = match fallback {
        Some(fallback) => Arc::new(WithFallback::new(rest, fallback)),
        None => Arc::new(rest),
    };
    Ok(source)
}

/// Loads the comments of `delivery`, going on with what loaded if some are broken
async fn load_thread(
    source: &dyn DataSource,
    delivery: &DeliveryId,
) -> anyhow::Result<CommentTree> {
    let mut tree = CommentTree::new(delivery.clone(), User::stub());
    match tree.refresh(source).await {
        Ok(()) => (),
        Err(Error::InvalidData(e)) => {
            tracing::warn!(%delivery, error = %e, "comment thread is incomplete");
        }
        Err(e) => {
            return Err(e).with_context(|| format!("fetching comments of delivery {delivery}"))
        }
    }
    Ok(tree)
}

fn show_match(m: &Match) {
    print!("[{}] {} v {}, {} ({})", m.id, m.team1, m.team2, m.venue, m.status);
    if let Some(score) = &m.score {
        if let Some(s) = &score.team1 {
            print!("  {}: {s}", m.team1);
        }
        if let Some(s) = &score.team2 {
            print!("  {}: {s}", m.team2);
        }
    }
    println!();
}

fn show_delivery(d: &DeliveryItem) {
    if d.kind() == DeliveryKind::Commentary {
        println!("        {}", d.description);
        return;
    }
    let tag = match (d.is_wicket, d.is_four, d.is_six) {
        (true, _, _) => "W",
        (_, true, _) => "4",
        (_, _, true) => "6",
        _ => "",
    };
    println!(
        "{:>3}.{} {:>2} {} to {}: {} [{}, {} comments]",
        d.over, d.ball, tag, d.bowler, d.batsman, d.description, d.id, d.comment_count
    );
}

fn show_thread(tree: &CommentTree) {
    for entry in tree.flatten() {
        let c = entry.comment;
        let vote = match c.user_vote {
            Some(v) => format!(" (you: {v})"),
            None => String::new(),
        };
        println!(
            "{:indent$}[{}] {}: {}  +{} -{}{}",
            "",
            c.id,
            c.author.username,
            c.content,
            c.upvotes,
            c.downvotes,
            vote,
            indent = 2 * entry.depth,
        );
    }
}

async fn watch(
    source: Arc<dyn DataSource>,
    status: Option<MatchStatus>,
    period: Duration,
    updates: Option<usize>,
) -> anyhow::Result<()> {
    let (sink, mut listings) = tokio::sync::mpsc::unbounded_channel();
    let poller = LivePoller::start(source, status, period, sink);
    let mut seen = 0;
    loop {
        tokio::select! {
            res = tokio::signal::ctrl_c() => {
                res.context("listening for ctrl-c")?;
                break;
            }
            listing = listings.recv() => {
                let Some(listing) = listing else { break };
                println!("--");
                listing.iter().for_each(show_match);
                seen += 1;
                if updates.map(|u| seen >= u).unwrap_or(false) {
                    break;
                }
            }
        }
    }
    poller.stop().await;
    Ok(())
}


#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt::init();
    let opt = <Opt as structopt::StructOpt>::from_args();
    let source = open_source(&opt)?;

    match opt.cmd {
        Command::Feed { limit } => {
            let items = source
                .fetch_feed(limit)
                .await
                .context("fetching delivery feed")?;
            items.iter().for_each(show_delivery);
        }
        Command::Matches { status } => {
            let matches = source
                .fetch_matches(status)
                .await
                .context("fetching matches")?;
            matches.iter().for_each(show_match);
        }
        Command::Match { id, filter, pages } => {
            let m = source
                .fetch_match(&id)
                .await
                .with_context(|| format!("fetching match {id}"))?;
            show_match(&m);
            let mut feed = DeliveryFeed::new();
            feed.refresh(&*source, id.clone(), filter)
                .await
                .with_context(|| format!("fetching commentary of match {id}"))?;
            for _ in 1..pages {
                if !feed.has_more() {
                    break;
                }
                feed.fetch_more(&*source)
                    .await
                    .with_context(|| format!("fetching more commentary of match {id}"))?;
            }
            feed.visible_items().for_each(show_delivery);
            if feed.has_more() {
                println!("(more available)");
            }
        }
        Command::Comments { delivery } => {
            let tree = load_thread(&*source, &delivery).await?;
            show_thread(&tree);
        }
        Command::Reply {
            delivery,
            content,
            parent,
        } => {
            let mut tree = load_thread(&*source, &delivery).await?;
            let c = tree
                .submit_reply(&*source, parent.as_ref(), &content)
                .await
                .context("posting reply")?;
            println!("posted comment {}", c.id);
        }
        Command::Vote {
            delivery,
            comment,
            vote,
        } => {
            let mut tree = load_thread(&*source, &delivery).await?;
            let c = tree
                .submit_vote(&*source, &comment, vote)
                .await
                .with_context(|| format!("voting on comment {comment}"))?;
            println!("comment {}: +{} -{}", c.id, c.upvotes, c.downvotes);
        }
        Command::Watch {
            status,
            period,
            updates,
        } => {
            let period = period
                .map(Duration::from_secs)
                .unwrap_or(LIVE_REFRESH_INTERVAL);
            anyhow::ensure!(!period.is_zero(), "refresh period must be positive");
            watch(source, status, period, updates).await?;
        }
        Command::Stats => {
            let players = source
                .fetch_player_stats()
                .await
                .context("fetching player stats")?;
            for p in players {
                println!(
                    "{}: {} matches, {} runs at {:.2} (SR {:.2}), {} wickets",
                    p.player_name, p.matches, p.runs, p.average, p.strike_rate, p.wickets
                );
            }
            let teams = source
                .fetch_team_stats()
                .await
                .context("fetching team stats")?;
            for t in teams {
                println!(
                    "{}: {} matches, {} won, {} lost ({:.1}%)",
                    t.team_name, t.matches, t.wins, t.losses, t.win_percentage
                );
            }
        }
    }

    Ok(())
}
