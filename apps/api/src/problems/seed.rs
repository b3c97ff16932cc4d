use chrono::{DateTime, TimeZone, Utc};

use crate::models::problem::{Comment, Problem, ProblemStatus};
use crate::models::user::Location;

/// Categories offered on the submission form.
pub const CATEGORIES: &[&str] = &[
    "Water & Sanitation",
    "Education",
    "Healthcare",
    "Environment",
    "Infrastructure",
    "Food Security",
    "Women Empowerment",
    "Child Welfare",
    "Elderly Care",
    "Disability Support",
    "Other",
];

fn date(year: i32, month: u32, day: u32) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(year, month, day, 0, 0, 0)
        .single()
        .unwrap_or_default()
}

fn avatar(seed: &str) -> Option<String> {
    Some(format!("https://i.pravatar.cc/150?u={seed}"))
}

/// Fixed sample problems the store starts with.
pub fn sample_problems() -> Vec<Problem> {
    vec![
        Problem {
            id: "1".into(),
            title: "Need clean water access in rural village".into(),
            description: "Our village has been suffering from water scarcity for the past month. \
                We need help with digging a new well or providing water purification systems."
                .into(),
            category: "Water & Sanitation".into(),
            created_at: date(2023, 6, 15),
            author_id: "2".into(),
            author_name: "Raj Kumar".into(),
            author_avatar: avatar("raj"),
            status: ProblemStatus::Open,
            location: Some(Location::new(28.6139, 77.2090).with_address("Delhi, India")),
            helper_id: None,
            helper_name: None,
            comments: vec![],
            upvotes: 15,
        },
        Problem {
            id: "2".into(),
            title: "Education materials needed for children".into(),
            description: "We're looking for books, stationery, and learning materials for \
                underprivileged children in our community school."
                .into(),
            category: "Education".into(),
            created_at: date(2023, 5, 28),
            author_id: "3".into(),
            author_name: "Priya Singh".into(),
            author_avatar: avatar("priya"),
            status: ProblemStatus::InProgress,
            location: Some(Location::new(12.9716, 77.5946).with_address("Bangalore, India")),
            helper_id: Some("1".into()),
            helper_name: Some("NGO Education First".into()),
            comments: vec![Comment {
                id: "c1".into(),
                problem_id: "2".into(),
                user_id: "1".into(),
                user_name: "NGO Education First".into(),
                user_avatar: avatar("ngo1"),
                content: "We're collecting the materials and will deliver them next week.".into(),
                created_at: date(2023, 6, 2),
            }],
            upvotes: 23,
        },
        Problem {
            id: "3".into(),
            title: "Medical camp needed in slum area".into(),
            description: "There's an outbreak of seasonal flu in our slum area. \
                We need medical volunteers and medicines."
                .into(),
            category: "Healthcare".into(),
            created_at: date(2023, 6, 20),
            author_id: "4".into(),
            author_name: "Amit Verma".into(),
            author_avatar: avatar("amit"),
            status: ProblemStatus::Open,
            location: Some(Location::new(19.0760, 72.8777).with_address("Mumbai, India")),
            helper_id: None,
            helper_name: None,
            comments: vec![],
            upvotes: 8,
        },
        Problem {
            id: "4".into(),
            title: "Need volunteers for tree plantation drive".into(),
            description: "We're organizing a tree plantation drive in our community \
                and need volunteers and saplings."
                .into(),
            category: "Environment".into(),
            created_at: date(2023, 7, 5),
            author_id: "5".into(),
            author_name: "Green Earth Initiative".into(),
            author_avatar: avatar("greenearth"),
            status: ProblemStatus::Open,
            location: Some(Location::new(26.8467, 80.9462).with_address("Lucknow, India")),
            helper_id: None,
            helper_name: None,
            comments: vec![],
            upvotes: 12,
        },
    ]
}
