//! The `quizforge capabilities` command.

use anyhow::Result;
use comfy_table::{Cell, Table};

use quizforge_core::capability::CapabilityMatrix;
use quizforge_core::{capabilities_for, SubscriptionTier};

pub fn execute(tier: Option<String>) -> Result<()> {
    let tiers: Vec<SubscriptionTier> = match tier {
        Some(raw) => vec![raw.parse().map_err(|e: String| anyhow::anyhow!("{}", e))?],
        None => SubscriptionTier::ALL.to_vec(),
    };

    let mut table = Table::new();
    table.set_header(vec![
        "Tier",
        "Max questions",
        "Question types",
        "Share beyond followers",
        "Communities",
        "Analytics",
        "Storage",
    ]);

    for tier in tiers {
        let caps = capabilities_for(tier);
        table.add_row(row(&caps));
    }

    println!("{table}");
    Ok(())
}

fn yes_no(flag: bool) -> &'static str {
    if flag {
        "yes"
    } else {
        "no"
    }
}

fn row(caps: &CapabilityMatrix) -> Vec<Cell> {
    let max = caps
        .max_questions_per_quiz
        .map(|m| m.to_string())
        .unwrap_or_else(|| "unbounded".to_string());
    let types = caps
        .allowed_question_types
        .iter()
        .map(|t| t.to_string())
        .collect::<Vec<_>>()
        .join(", ");

    vec![
        Cell::new(caps.tier),
        Cell::new(max),
        Cell::new(types),
        Cell::new(yes_no(caps.can_share_beyond_followers)),
        Cell::new(yes_no(caps.can_create_communities)),
        Cell::new(yes_no(caps.has_analytics)),
        Cell::new(format!("{} MB", caps.storage_limit_mb)),
    ]
}
