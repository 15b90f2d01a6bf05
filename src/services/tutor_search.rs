use std::cmp::Ordering;

use crate::database::models::tutor::TutorSummary;

/// Bucket of an average review score: `k` holds `[k, k+1)`, 5 holds exactly 5.
pub fn score_bucket(average: f64) -> u8 {
    average.floor().clamp(0.0, 5.0) as u8
}

fn by_score_then_name(a: &TutorSummary, b: &TutorSummary) -> Ordering {
    b.review_score
        .partial_cmp(&a.review_score)
        .unwrap_or(Ordering::Equal)
        .then_with(|| a.full_name.to_lowercase().cmp(&b.full_name.to_lowercase()))
}

/// Select and order tutors for a search.
///
/// Without a requested score every candidate is returned. With one, the
/// matching bucket is topped up from lower buckets (best first) until it
/// holds `min_results` tutors or the lower buckets run out.
pub fn rank(mut candidates: Vec<TutorSummary>, review_score: Option<u8>, min_results: usize) -> Vec<TutorSummary> {
    let Some(wanted) = review_score else {
        candidates.sort_by(by_score_then_name);
        return candidates;
    };

    let (mut selected, rest): (Vec<_>, Vec<_>) = candidates
        .into_iter()
        .partition(|t| score_bucket(t.review_score) == wanted);

    if selected.len() < min_results {
        let mut lower: Vec<_> = rest
            .into_iter()
            .filter(|t| score_bucket(t.review_score) < wanted)
            .collect();
        lower.sort_by(by_score_then_name);
        let missing = min_results - selected.len();
        selected.extend(lower.into_iter().take(missing));
    }

    selected.sort_by(by_score_then_name);
    selected
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::RequestStatus;
    use rust_decimal::Decimal;
    use uuid::Uuid;

    fn tutor(name: &str, score: f64) -> TutorSummary {
        TutorSummary {
            user_id: Uuid::new_v4(),
            full_name: name.to_string(),
            email: format!("{}@example.com", name.to_lowercase()),
            address: None,
            image_url: None,
            about_me: None,
            start_age: 3,
            end_age: 10,
            price_from: Decimal::new(100, 0),
            price_end: Decimal::new(200, 0),
            session_hours: 1.5,
            request_status: RequestStatus::Approve,
            review_score: score,
            total_review: if score > 0.0 { 3 } else { 0 },
        }
    }

    fn names(tutors: &[TutorSummary]) -> Vec<&str> {
        tutors.iter().map(|t| t.full_name.as_str()).collect()
    }

    #[test]
    fn buckets_are_half_open() {
        assert_eq!(score_bucket(0.0), 0);
        assert_eq!(score_bucket(3.0), 3);
        assert_eq!(score_bucket(3.99), 3);
        assert_eq!(score_bucket(4.5), 4);
        assert_eq!(score_bucket(5.0), 5);
    }

    #[test]
    fn no_score_filter_orders_everyone() {
        let ranked = rank(vec![tutor("Bao", 3.0), tutor("An", 4.0), tutor("Chi", 4.0)], None, 9);
        assert_eq!(names(&ranked), vec!["An", "Chi", "Bao"]);
    }

    #[test]
    fn sparse_bucket_is_padded_from_lower_buckets_only() {
        let candidates = vec![
            tutor("Five", 5.0),
            tutor("FourHigh", 4.8),
            tutor("FourLow", 4.1),
            tutor("ThreeHigh", 3.9),
            tutor("Two", 2.0),
            tutor("None", 0.0),
        ];
        let ranked = rank(candidates, Some(4), 4);
        assert_eq!(names(&ranked), vec!["FourHigh", "FourLow", "ThreeHigh", "Two"]);
    }

    #[test]
    fn full_bucket_is_not_padded() {
        let candidates = vec![tutor("A", 3.2), tutor("B", 3.5), tutor("C", 2.5)];
        let ranked = rank(candidates, Some(3), 2);
        assert_eq!(names(&ranked), vec!["B", "A"]);
    }

    #[test]
    fn padding_stops_when_candidates_run_out() {
        let ranked = rank(vec![tutor("Only", 1.0)], Some(5), 9);
        assert_eq!(names(&ranked), vec!["Only"]);
    }
}
