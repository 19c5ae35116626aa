use super::Record;
use rand::seq::SliceRandom;
use rand::Rng;

pub const INTEREST_POOL: [&str; 30] = [
    "python", "ml", "data science", "visualizations", "django", "flask", "backend",
    "html", "css", "javascript", "react", "node.js", "frontend", "sql", "nosql",
    "cloud", "aws", "devops", "security", "ai", "nlp", "big data", "statistics",
    "java", "kotlin", "android", "ios", "swift", "tensorflow", "pytorch",
];

/// `count` records named `user1..=userN`, each with `per_user` distinct
/// interests sampled from [`INTEREST_POOL`].
pub fn generate(count: usize, per_user: usize) -> Vec<Record> {
    generate_with(&mut rand::thread_rng(), count, per_user)
}

pub fn generate_with<R: Rng + ?Sized>(rng: &mut R, count: usize, per_user: usize) -> Vec<Record> {
    let per_user = per_user.clamp(1, INTEREST_POOL.len());
    (1..=count)
        .map(|i| {
            let interests = INTEREST_POOL
                .choose_multiple(rng, per_user)
                .copied()
                .collect::<Vec<_>>()
                .join(",");
            Record::new(format!("user{}", i), interests)
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::recommend::normalize_interests;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[test]
    fn generates_named_users_with_distinct_interests() {
        let mut rng = StdRng::seed_from_u64(7);
        let records = generate_with(&mut rng, 10, 4);
        assert_eq!(records.len(), 10);
        for (i, record) in records.iter().enumerate() {
            assert_eq!(record.name, format!("user{}", i + 1));
            let interests = normalize_interests(&record.interests);
            assert_eq!(interests.len(), 4);
            assert!(interests.iter().all(|t| INTEREST_POOL.contains(&t.as_str())));
        }
    }

    #[test]
    fn clamps_interests_to_pool() {
        let records = generate(2, 100);
        assert_eq!(normalize_interests(&records[0].interests).len(), INTEREST_POOL.len());
        assert_eq!(normalize_interests(&generate(1, 0)[0].interests).len(), 1);
    }
}
