use chrono::{Duration, Utc};
use cricbase_api::{
    Comment, CommentId, DeliveryId, DeliveryItem, InningsScore, Match, MatchFormat, MatchId,
    MatchScore, MatchStatus, PlayerStats, TeamStats, Time, User, UserId,
};

use crate::MockDump;

fn fan(id: &str, name: &str, email: &str) -> User {
    User {
        id: UserId::from(id),
        username: String::from(name),
        email: String::from(email),
        avatar: None,
        created_at: None,
    }
}

fn innings(runs: u32, wickets: u32, overs: f64) -> Option<InningsScore> {
    Some(InningsScore {
        runs,
        wickets,
        overs,
    })
}

fn game(id: &str, team1: &str, team2: &str, venue: &str, status: MatchStatus, date: Time) -> Match {
    Match {
        id: MatchId::from(id),
        team1: String::from(team1),
        team2: String::from(team2),
        team1_logo: None,
        team2_logo: None,
        venue: String::from(venue),
        status,
        date,
        format: MatchFormat::T20,
        score: None,
        current_over: None,
        current_ball: None,
    }
}

struct Ball {
    id: &'static str,
    over: u32,
    ball: u32,
    bowler: &'static str,
    batsman: &'static str,
    runs: u32,
    wicket: Option<&'static str>,
    description: &'static str,
    comments: u32,
}

impl Ball {
    fn into_item(self, now: Time, seq: i64) -> DeliveryItem {
        DeliveryItem {
            id: DeliveryId::from(self.id),
            match_id: MatchId::from("1"),
            over: self.over,
            ball: self.ball,
            bowler: String::from(self.bowler),
            batsman: String::from(self.batsman),
            runs: self.runs,
            is_wicket: self.wicket.is_some(),
            wicket_type: self.wicket.map(String::from),
            is_four: self.runs == 4 && self.wicket.is_none(),
            is_six: self.runs == 6 && self.wicket.is_none(),
            description: String::from(self.description),
            timestamp: Some(now - Duration::minutes(seq)),
            comment_count: self.comments,
            type_tag: None,
        }
    }
}

fn comment(
    id: &str,
    author: User,
    content: &str,
    at: Time,
    (upvotes, downvotes): (u32, u32),
    parent: Option<&str>,
) -> Comment {
    Comment {
        id: CommentId::from(id),
        delivery_id: Some(DeliveryId::from("1_93")),
        user_id: Some(author.id.clone()),
        user: author,
        content: String::from(content),
        created_at: at,
        upvotes,
        downvotes,
        parent_id: parent.map(CommentId::from),
        replies: Vec::new(),
        user_vote: None,
    }
}

/// The development data the backend serves when its database is unreachable
pub fn dump() -> MockDump {
    let now = Utc::now();

    let mut india = game(
        "1",
        "India",
        "Australia",
        "MCG, Melbourne",
        MatchStatus::Live,
        now,
    );
    india.score = Some(MatchScore {
        team1: innings(185, 4, 20.),
        team2: innings(120, 3, 15.2),
    });
    india.current_over = Some(15);
    india.current_ball = Some(2);
    let mut england = game(
        "2",
        "England",
        "Pakistan",
        "Lord's, London",
        MatchStatus::Upcoming,
        now + Duration::days(2),
    );
    england.format = MatchFormat::Odi;
    let mut kiwis = game(
        "3",
        "New Zealand",
        "South Africa",
        "Eden Park, Auckland",
        MatchStatus::Completed,
        now - Duration::days(1),
    );
    kiwis.score = Some(MatchScore {
        team1: innings(210, 6, 20.),
        team2: innings(195, 8, 20.),
    });

    let balls = vec![
        Ball {
            id: "1_93",
            over: 15,
            ball: 3,
            bowler: "Pat Cummins",
            batsman: "Virat Kohli",
            runs: 6,
            wicket: None,
            description: "Massive six! Kohli sends it over long-on for a maximum!",
            comments: 3,
        },
        Ball {
            id: "1_92",
            over: 15,
            ball: 2,
            bowler: "Pat Cummins",
            batsman: "Virat Kohli",
            runs: 4,
            wicket: None,
            description: "Driven through extra cover, no stopping that.",
            comments: 0,
        },
        Ball {
            id: "1_91",
            over: 15,
            ball: 1,
            bowler: "Pat Cummins",
            batsman: "Shubman Gill",
            runs: 0,
            wicket: Some("caught"),
            description: "Gill edges it and Smith takes a sharp catch at second slip.",
            comments: 0,
        },
        Ball {
            id: "1_90",
            over: 14,
            ball: 6,
            bowler: "Adam Zampa",
            batsman: "Virat Kohli",
            runs: 1,
            wicket: None,
            description: "Worked to deep midwicket for a single to keep the strike.",
            comments: 0,
        },
        Ball {
            id: "1_88",
            over: 14,
            ball: 5,
            bowler: "Adam Zampa",
            batsman: "Shubman Gill",
            runs: 0,
            wicket: None,
            description: "Googly, beaten all ends up.",
            comments: 0,
        },
    ];
    let mut deliveries = balls
        .into_iter()
        .enumerate()
        .map(|(i, b)| b.into_item(now, i as i64))
        .collect::<Vec<_>>();
    deliveries.insert(
        4,
        DeliveryItem {
            id: DeliveryId::from("1_89"),
            match_id: MatchId::from("1"),
            over: 14,
            ball: 5,
            bowler: String::new(),
            batsman: String::new(),
            runs: 0,
            is_wicket: false,
            wicket_type: None,
            is_four: false,
            is_six: false,
            description: String::from("Drinks break. India need 66 from 28 balls."),
            timestamp: Some(now - Duration::minutes(4)),
            comment_count: 0,
            type_tag: Some(String::from("commentary")),
        },
    );

    let comments = vec![
        comment(
            "1",
            fan("2", "cricket_lover", "fan@example.com"),
            "What a shot! Kohli is in amazing form today!",
            now - Duration::hours(1),
            (15, 2),
            None,
        ),
        comment(
            "2",
            fan("3", "stats_guru", "stats@example.com"),
            "His strike rate has been incredible this season!",
            now - Duration::minutes(30),
            (8, 0),
            Some("1"),
        ),
        comment(
            "3",
            fan("4", "bowling_fan", "bowling@example.com"),
            "Cummins needs to adjust his line here.",
            now - Duration::minutes(15),
            (5, 3),
            None,
        ),
    ];

    MockDump {
        viewer: User::stub(),
        matches: vec![india, england, kiwis],
        deliveries,
        comments,
        player_stats: vec![PlayerStats {
            player_id: String::from("1"),
            player_name: String::from("Virat Kohli"),
            matches: 254,
            runs: 12169,
            wickets: 0,
            average: 57.38,
            strike_rate: 93.17,
            economy: None,
        }],
        team_stats: vec![TeamStats {
            team_id: String::from("1"),
            team_name: String::from("India"),
            matches: 1024,
            wins: 638,
            losses: 350,
            win_percentage: 62.3,
        }],
    }
}
