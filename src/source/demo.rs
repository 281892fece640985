use crate::engine::model::{Edge, GraphSnapshot, MetadataValue, NodeKind, NodeSpec};

const PERSONALITY_TYPES: [(&str, &str); 16] = [
    ("INTJ", "Architect"),
    ("INTP", "Logician"),
    ("ENTJ", "Commander"),
    ("ENTP", "Debater"),
    ("INFJ", "Advocate"),
    ("INFP", "Mediator"),
    ("ENFJ", "Protagonist"),
    ("ENFP", "Campaigner"),
    ("ISTJ", "Logistician"),
    ("ISFJ", "Defender"),
    ("ESTJ", "Executive"),
    ("ESFJ", "Consul"),
    ("ISTP", "Virtuoso"),
    ("ISFP", "Adventurer"),
    ("ESTP", "Entrepreneur"),
    ("ESFP", "Entertainer"),
];

const CAREERS: [&str; 12] = [
    "Data Scientist",
    "Software Engineer",
    "UX Designer",
    "Product Manager",
    "Educator",
    "Nurse",
    "Architect",
    "Journalist",
    "Financial Analyst",
    "Research Scientist",
    "Counselor",
    "Entrepreneur",
];

const SKILLS: [&str; 14] = [
    "Statistics",
    "Programming",
    "Visual Design",
    "Writing",
    "Public Speaking",
    "Empathy",
    "Leadership",
    "Research",
    "Negotiation",
    "Modeling",
    "Critical Thinking",
    "Project Planning",
    "Teaching",
    "Accounting",
];

const COURSES: [(&str, [usize; 2]); 10] = [
    ("Intro to Statistics", [0, 10]),
    ("Programming Fundamentals", [1, 10]),
    ("Design Thinking", [2, 5]),
    ("Academic Writing", [3, 7]),
    ("Speech and Debate", [4, 8]),
    ("Psychology 101", [5, 12]),
    ("Team Leadership", [6, 11]),
    ("Research Methods", [7, 0]),
    ("Financial Literacy", [13, 9]),
    ("Machine Learning", [9, 1]),
];

const LEARNING_PATHS: [(&str, [usize; 3]); 5] = [
    ("Data Track", [0, 1, 9]),
    ("Creative Track", [2, 3, 5]),
    ("Leadership Track", [4, 6, 8]),
    ("Care Track", [5, 3, 4]),
    ("Research Track", [7, 0, 3]),
];

const FIRST_NAMES: [&str; 12] = [
    "Ada", "Ben", "Chloe", "Dev", "Elif", "Farid", "Grace", "Hiro", "Ines", "Jonah", "Kemi", "Lena",
];

const DEFAULT_STUDENTS: usize = 24;

/// Deterministic pseudo-random value in `[0, 1)`.
fn rand_simple(seed: u64, salt: usize) -> f64 {
    let mixed = seed
        .wrapping_mul(6_364_136_223_846_793_005)
        .wrapping_add((salt as u64 + 1).wrapping_mul(1_442_695_040_888_963_407));
    let x = (mixed >> 11) % 233_280;
    x as f64 / 233_280.0
}

fn pick(seed: u64, salt: usize, len: usize) -> usize {
    ((rand_simple(seed, salt) * len as f64) as usize).min(len - 1)
}

/// Synthetic education graph: students, personality types, careers, skills,
/// courses and learning paths. Same seed, same graph.
pub fn generate_demo_graph(seed: u64, students: usize) -> GraphSnapshot {
    let mut nodes = Vec::new();
    let mut edges = Vec::new();

    for (code, nickname) in PERSONALITY_TYPES {
        nodes.push(
            NodeSpec::new(format!("type-{}", code.to_lowercase()), code, NodeKind::PersonalityType)
                .with_description(format!("The {nickname}")),
        );
    }
    for (index, career) in CAREERS.iter().enumerate() {
        nodes.push(
            NodeSpec::new(format!("career-{index}"), *career, NodeKind::Career).with_metadata(
                "demand",
                MetadataValue::Number((40.0 + rand_simple(seed, 900 + index) * 60.0).round()),
            ),
        );
    }
    for (index, skill) in SKILLS.iter().enumerate() {
        nodes.push(NodeSpec::new(format!("skill-{index}"), *skill, NodeKind::Skill));
    }
    for (index, (course, taught)) in COURSES.iter().enumerate() {
        let id = format!("course-{index}");
        nodes.push(NodeSpec::new(&id, *course, NodeKind::Course));
        for skill in taught {
            edges.push(Edge::new(&id, format!("skill-{skill}"), "teaches", "teaches"));
        }
    }
    for (index, (path, courses)) in LEARNING_PATHS.iter().enumerate() {
        let id = format!("path-{index}");
        nodes.push(NodeSpec::new(&id, *path, NodeKind::LearningPath));
        for (step, course) in courses.iter().enumerate() {
            edges.push(Edge::new(
                &id,
                format!("course-{course}"),
                "includes",
                format!("step {}", step + 1),
            ));
        }
    }

    for (index, _) in CAREERS.iter().enumerate() {
        for offset in 0..2 {
            let skill = pick(seed, 100 + index * 2 + offset, SKILLS.len());
            edges.push(Edge::new(
                format!("career-{index}"),
                format!("skill-{skill}"),
                "requires",
                "requires",
            ));
        }
    }
    for (index, (code, _)) in PERSONALITY_TYPES.iter().enumerate() {
        for offset in 0..2 {
            let career = pick(seed, 300 + index * 2 + offset, CAREERS.len());
            edges.push(Edge::new(
                format!("type-{}", code.to_lowercase()),
                format!("career-{career}"),
                "suits",
                "suits",
            ));
        }
    }

    for index in 0..students {
        let id = format!("student-{index}");
        let name = format!("{} {}", FIRST_NAMES[index % FIRST_NAMES.len()], index + 1);
        let personality = pick(seed, 500 + index * 3, PERSONALITY_TYPES.len());
        let career = pick(seed, 501 + index * 3, CAREERS.len());
        let path = pick(seed, 502 + index * 3, LEARNING_PATHS.len());
        let year = 1 + pick(seed, 700 + index, 4);

        nodes.push(
            NodeSpec::new(&id, name, NodeKind::Student)
                .with_metadata("year", MetadataValue::Number(year as f64)),
        );
        edges.push(Edge::new(
            &id,
            format!("type-{}", PERSONALITY_TYPES[personality].0.to_lowercase()),
            "has_type",
            "is",
        ));
        edges.push(Edge::new(
            &id,
            format!("career-{career}"),
            "interested_in",
            "interested in",
        ));
        edges.push(Edge::new(&id, format!("path-{path}"), "follows", "follows"));
    }

    GraphSnapshot { nodes, edges }
}

pub fn default_demo_graph(seed: u64) -> GraphSnapshot {
    generate_demo_graph(seed, DEFAULT_STUDENTS)
}

#[cfg(test)]
mod tests {
    use std::collections::HashSet;

    use super::*;

    #[test]
    fn same_seed_same_graph() {
        assert_eq!(default_demo_graph(3), default_demo_graph(3));
        assert_ne!(default_demo_graph(3), default_demo_graph(4));
    }

    #[test]
    fn every_edge_endpoint_exists_and_ids_are_unique() {
        let snapshot = generate_demo_graph(11, 40);
        let ids = snapshot
            .nodes
            .iter()
            .map(|node| node.id.as_str())
            .collect::<HashSet<_>>();
        assert_eq!(ids.len(), snapshot.nodes.len());
        for edge in &snapshot.edges {
            assert!(ids.contains(edge.source_id.as_str()), "{}", edge.source_id);
            assert!(ids.contains(edge.target_id.as_str()), "{}", edge.target_id);
        }
    }

    #[test]
    fn covers_every_kind() {
        let snapshot = default_demo_graph(0);
        for kind in NodeKind::ALL {
            assert!(snapshot.nodes.iter().any(|node| node.kind == kind), "{kind:?}");
        }
        assert_eq!(
            snapshot
                .nodes
                .iter()
                .filter(|node| node.kind == NodeKind::Student)
                .count(),
            DEFAULT_STUDENTS
        );
    }

    #[test]
    fn picks_stay_in_range() {
        for salt in 0..500 {
            assert!(pick(99, salt, 7) < 7);
            let value = rand_simple(99, salt);
            assert!((0.0..1.0).contains(&value));
        }
    }
}
