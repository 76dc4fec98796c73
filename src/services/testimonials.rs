// Testimonials service: collect feedback on field agents and summarize it.
//
// Analytics are computed only from stored responses.

use std::collections::HashMap;

use serde::Serialize;

use crate::db::{AgentDb, AgentRole, DbTestimonial};
use crate::error::AppError;
use crate::forms::{validate_mobile, TestimonialForm};
use crate::util::{new_id, now_rfc3339};

/// Store a response after confirming the agent is registered.
pub fn submit_testimonial(db: &AgentDb, form: &TestimonialForm) -> Result<DbTestimonial, AppError> {
    let form = form.validate()?;
    if db.find_mobile_owner(&form.agent_mobile, None)?.is_none() {
        return Err(AppError::NotRegistered(form.agent_mobile));
    }
    let row = DbTestimonial {
        id: new_id(),
        agent_mobile: form.agent_mobile,
        respondent_name: form.respondent_name,
        respondent_mobile: form.respondent_mobile,
        score: form.score,
        comment: form.comment,
        created_at: now_rfc3339(),
    };
    db.insert_testimonial(&row)?;
    Ok(row)
}

pub fn list_testimonials(
    db: &AgentDb,
    agent_mobile: Option<&str>,
) -> Result<Vec<DbTestimonial>, AppError> {
    let mobile = agent_mobile.map(validate_mobile).transpose()?;
    Ok(db.get_testimonials(mobile.as_deref())?)
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AgentFeedback {
    pub agent_mobile: String,
    pub agent_name: Option<String>,
    pub role: Option<AgentRole>,
    pub responses: usize,
    pub average_score: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TestimonialAnalytics {
    pub total_responses: usize,
    /// 0.0 when there are no responses.
    pub average_score: f64,
    /// Counts for scores 1..=5, index 0 is score 1.
    pub distribution: [usize; 5],
    /// Highest average first; ties broken by more responses, then mobile.
    pub agents: Vec<AgentFeedback>,
}

fn average(sum: u32, count: usize) -> f64 {
    if count == 0 {
        0.0
    } else {
        f64::from(sum) / count as f64
    }
}

/// Aggregate responses. Agent names are resolved through `names`; a
/// response for a mobile that is no longer registered keeps `None`.
pub fn summarize(
    responses: &[DbTestimonial],
    names: &HashMap<String, (String, AgentRole)>,
) -> TestimonialAnalytics {
    let mut distribution = [0usize; 5];
    let mut total = 0u32;
    let mut per_agent: HashMap<&str, (u32, usize)> = HashMap::new();

    for r in responses {
        if !(1..=5).contains(&r.score) {
            log::warn!("Skipping testimonial {} with score {}", r.id, r.score);
            continue;
        }
        distribution[usize::from(r.score - 1)] += 1;
        total += u32::from(r.score);
        let entry = per_agent.entry(r.agent_mobile.as_str()).or_insert((0, 0));
        entry.0 += u32::from(r.score);
        entry.1 += 1;
    }

    let counted: usize = distribution.iter().sum();
    let mut agents: Vec<AgentFeedback> = per_agent
        .into_iter()
        .map(|(mobile, (sum, count))| {
            let known = names.get(mobile);
            AgentFeedback {
                agent_mobile: mobile.to_string(),
                agent_name: known.map(|(n, _)| n.clone()),
                role: known.map(|(_, r)| *r),
                responses: count,
                average_score: average(sum, count),
            }
        })
        .collect();
    agents.sort_by(|a, b| {
        b.average_score
            .total_cmp(&a.average_score)
            .then(b.responses.cmp(&a.responses))
            .then_with(|| a.agent_mobile.cmp(&b.agent_mobile))
    });

    TestimonialAnalytics {
        total_responses: counted,
        average_score: average(total, counted),
        distribution,
        agents,
    }
}

pub fn testimonial_analytics(db: &AgentDb) -> Result<TestimonialAnalytics, AppError> {
    let responses = db.get_testimonials(None)?;
    let names: HashMap<String, (String, AgentRole)> = db
        .get_all_agents(None)?
        .into_iter()
        .map(|a| (a.mobile_number, (a.name, a.role)))
        .collect();
    Ok(summarize(&responses, &names))
}
