use chrono::{Duration, Utc};
use cricbase_api::{
    Comment, CommentId, DeliveryId, DeliveryItem, InningsScore, Match, MatchFormat, MatchId,
    MatchScore, MatchStatus, PlayerStats, TeamStats, User, UserId,
};
use cricbase_mock_server::MockDump;
use rand::{seq::SliceRandom, Rng};

const NUM_USERS: usize = 8;

const NUM_MATCHES: usize = 6;
const NUM_BALLS: usize = 120;
const COMMENTARY_ODDS: f64 = 0.05;

const COMMENTED_DELIVERIES: usize = 20;
const MAX_COMMENTS_PER_DELIVERY: usize = 12;
const COMMENT_WORD_COUNT: usize = 12;

const TEAMS: [&str; 10] = [
    "India",
    "Australia",
    "England",
    "Pakistan",
    "New Zealand",
    "South Africa",
    "Sri Lanka",
    "West Indies",
    "Bangladesh",
    "Afghanistan",
];

const VENUES: [&str; 6] = [
    "MCG, Melbourne",
    "Lord's, London",
    "Eden Park, Auckland",
    "Eden Gardens, Kolkata",
    "Newlands, Cape Town",
    "Gaddafi Stadium, Lahore",
];

fn gen_name(rng: &mut impl Rng) -> String {
    let first = lipsum::lipsum_words_with_rng(&mut *rng, 1);
    let last = lipsum::lipsum_words_with_rng(&mut *rng, 1);
    format!("{} {}", capitalize(&first), capitalize(&last))
}

fn capitalize(word: &str) -> String {
    let word = word.trim_matches(|c: char| !c.is_alphabetic());
    let mut chars = word.chars();
    match chars.next() {
        Some(c) => c.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

fn gen_innings(rng: &mut impl Rng, overs: f64) -> Option<InningsScore> {
    Some(InningsScore {
        runs: rng.gen_range(80..260),
        wickets: rng.gen_range(0..=10),
        overs,
    })
}

fn gen_balls(rng: &mut impl Rng, m: &MatchId, players: &[String]) -> Vec<DeliveryItem> {
    let now = Utc::now();
    let mut res = Vec::with_capacity(NUM_BALLS);
    // most recent first, so the sequence numbers in the ids go down
    for seq in (1..=NUM_BALLS).rev() {
        let over = ((seq - 1) / 6) as u32;
        let ball = ((seq - 1) % 6 + 1) as u32;
        let timestamp = Some(now - Duration::seconds(40 * (NUM_BALLS - seq) as i64));
        if rng.gen_bool(COMMENTARY_ODDS) {
            res.push(DeliveryItem {
                id: DeliveryId(format!("{m}_{seq}c")),
                match_id: m.clone(),
                over,
                ball,
                bowler: String::new(),
                batsman: String::new(),
                runs: 0,
                is_wicket: false,
                wicket_type: None,
                is_four: false,
                is_six: false,
                description: lipsum::lipsum_words_with_rng(&mut *rng, COMMENT_WORD_COUNT),
                timestamp,
                comment_count: 0,
                type_tag: Some(String::from("commentary")),
            });
        }
        let outcome = rng.gen_range(0..100);
        let (runs, is_wicket, is_four, is_six) = match outcome {
            0..=4 => (0, true, false, false),
            5..=14 => (4, false, true, false),
            15..=19 => (6, false, false, true),
            _ => (rng.gen_range(0..=3), false, false, false),
        };
        res.push(DeliveryItem {
            id: DeliveryId(format!("{m}_{seq}")),
            match_id: m.clone(),
            over,
            ball,
            bowler: players[rng.gen_range(0..players.len())].clone(),
            batsman: players[rng.gen_range(0..players.len())].clone(),
            runs,
            is_wicket,
            wicket_type: is_wicket.then(|| {
                ["bowled", "caught", "lbw", "run out", "stumped"]
                    .choose(&mut *rng)
                    .map(|s| String::from(*s))
                    .unwrap_or_default()
            }),
            is_four,
            is_six,
            description: lipsum::lipsum_words_with_rng(&mut *rng, COMMENT_WORD_COUNT),
            timestamp,
            comment_count: 0,
            type_tag: None,
        });
    }
    res
}

fn main() {
    let mut rng = rand::thread_rng();

    // Generate users, the first one being the viewer
    let users = (0..NUM_USERS)
        .map(|i| {
            let name = lipsum::lipsum_words_with_rng(&mut rng, 1).to_lowercase();
            let name = format!("{}_{i}", name.trim_matches(|c: char| !c.is_alphabetic()));
            User {
                id: UserId(i.to_string()),
                email: format!("{name}@example.com"),
                username: name,
                avatar: None,
                created_at: Some(Utc::now() - Duration::days(rng.gen_range(1..1000))),
            }
        })
        .collect::<Vec<_>>();
    let players = (0..22).map(|_| gen_name(&mut rng)).collect::<Vec<_>>();

    // Generate matches and their deliveries
    let mut matches = Vec::new();
    let mut deliveries = Vec::new();
    for i in 0..NUM_MATCHES {
        let id = MatchId((i + 1).to_string());
        let teams = TEAMS.choose_multiple(&mut rng, 2).collect::<Vec<_>>();
        let status = match i % 3 {
            0 => MatchStatus::Live,
            1 => MatchStatus::Upcoming,
            _ => MatchStatus::Completed,
        };
        let date = match status {
            MatchStatus::Upcoming => Utc::now() + Duration::days(rng.gen_range(1..30)),
            MatchStatus::Live => Utc::now(),
            MatchStatus::Completed => Utc::now() - Duration::days(rng.gen_range(1..30)),
        };
        let score = match status {
            MatchStatus::Upcoming => None,
            MatchStatus::Live => Some(MatchScore {
                team1: gen_innings(&mut rng, 20.),
                team2: gen_innings(&mut rng, 15.2),
            }),
            MatchStatus::Completed => Some(MatchScore {
                team1: gen_innings(&mut rng, 20.),
                team2: gen_innings(&mut rng, 20.),
            }),
        };
        if status != MatchStatus::Upcoming {
            deliveries.extend(gen_balls(&mut rng, &id, &players));
        }
        matches.push(Match {
            id,
            team1: String::from(*teams[0]),
            team2: String::from(*teams[1]),
            team1_logo: None,
            team2_logo: None,
            venue: String::from(*VENUES.choose(&mut rng).unwrap_or(&VENUES[0])),
            status,
            date,
            format: [MatchFormat::T20, MatchFormat::Odi, MatchFormat::Test][i % 3],
            score,
            current_over: (status == MatchStatus::Live).then_some(15),
            current_ball: (status == MatchStatus::Live).then_some(2),
        });
    }

    // Generate comment threads on a few deliveries
    let mut comments: Vec<Comment> = Vec::new();
    let candidates = deliveries
        .iter()
        .filter(|d| d.type_tag.is_none())
        .map(|d| d.id.clone())
        .collect::<Vec<_>>();
    let commented = candidates
        .choose_multiple(&mut rng, COMMENTED_DELIVERIES)
        .cloned()
        .collect::<Vec<_>>();
    for delivery in commented.iter() {
        let first = comments.len();
        let count = rng.gen_range(1..=MAX_COMMENTS_PER_DELIVERY);
        for _ in 0..count {
            // replies only point to earlier comments on the same delivery
            let parent = match comments.len() > first && rng.gen_bool(0.6) {
                true => Some(comments[rng.gen_range(first..comments.len())].id.clone()),
                false => None,
            };
            let author = users[rng.gen_range(0..users.len())].clone();
            comments.push(Comment {
                id: CommentId((comments.len() + 1).to_string()),
                delivery_id: Some(delivery.clone()),
                user_id: Some(author.id.clone()),
                user: author,
                content: lipsum::lipsum_words_with_rng(&mut rng, COMMENT_WORD_COUNT),
                created_at: Utc::now() - Duration::minutes(rng.gen_range(0..600)),
                upvotes: rng.gen_range(0..50),
                downvotes: rng.gen_range(0..10),
                parent_id: parent,
                replies: Vec::new(),
                user_vote: None,
            });
        }
        if let Some(d) = deliveries.iter_mut().find(|d| d.id == *delivery) {
            d.comment_count = count as u32;
        }
    }

    let player_stats = players
        .iter()
        .enumerate()
        .map(|(i, name)| {
            let matches = rng.gen_range(1..300);
            let runs = rng.gen_range(0..15000);
            PlayerStats {
                player_id: (i + 1).to_string(),
                player_name: name.clone(),
                matches,
                runs,
                wickets: rng.gen_range(0..400),
                average: f64::from(runs) / f64::from(matches),
                strike_rate: rng.gen_range(60.0..160.0),
                economy: rng.gen_bool(0.5).then(|| rng.gen_range(4.0..10.0)),
            }
        })
        .collect();
    let team_stats = TEAMS
        .iter()
        .enumerate()
        .map(|(i, name)| {
            let wins = rng.gen_range(100..700);
            let losses = rng.gen_range(100..500);
            TeamStats {
                team_id: (i + 1).to_string(),
                team_name: String::from(*name),
                matches: wins + losses,
                wins,
                losses,
                win_percentage: 100. * f64::from(wins) / f64::from(wins + losses),
            }
        })
        .collect();

    let dump = MockDump {
        viewer: users[0].clone(),
        matches,
        deliveries,
        comments,
        player_stats,
        team_stats,
    };
    println!(
        "{}",
        serde_json::to_string_pretty(&dump).expect("serializing mock dump")
    );
}
