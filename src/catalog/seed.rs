use std::collections::{BTreeMap, BTreeSet};

use chrono::Utc;

use crate::catalog::model::{CatalogState, Grade, Settings, Subject};

const ORDINARY_GRADES: [&str; 6] = ["grade6", "grade7", "grade8", "grade9", "grade10", "grade11"];
const ADVANCED_GRADE: &str = "al";

const ORDINARY_SUBJECTS: [(&str, &str, &str); 6] = [
    ("mathematics", "Mathematics", "bi-calculator"),
    ("science", "Science", "bi-flask"),
    ("sinhala", "Sinhala", "bi-book"),
    ("english", "English", "bi-globe"),
    ("tamil", "Tamil", "bi-book-half"),
    ("social-studies", "Social Studies", "bi-geo-alt"),
];

const ADVANCED_SUBJECTS: [(&str, &str, &str); 4] = [
    ("combined-maths", "Combined Mathematics", "bi-calculator-fill"),
    ("physics", "Physics", "bi-atom"),
    ("chemistry", "Chemistry", "bi-droplet"),
    ("biology", "Biology", "bi-tree"),
];

pub const SEEDED_GRADE_COUNT: usize = ORDINARY_GRADES.len() + 1;
pub const SEEDED_SUBJECT_COUNT: usize = ORDINARY_SUBJECTS.len() + ADVANCED_SUBJECTS.len();

/// Fresh catalog: all grades and subjects, no resources, empty activity log.
pub fn default_state() -> CatalogState {
    let mut grades = BTreeMap::new();
    for id in ORDINARY_GRADES {
        let label = format!("Grade {}", id.trim_start_matches("grade"));
        grades.insert(
            id.to_string(),
            Grade {
                name: label.clone(),
                display: label,
                active: true,
            },
        );
    }
    grades.insert(
        ADVANCED_GRADE.to_string(),
        Grade {
            name: "Advanced Level".to_string(),
            display: "A/L".to_string(),
            active: true,
        },
    );

    let ordinary: BTreeSet<String> = ORDINARY_GRADES.iter().map(|g| g.to_string()).collect();
    let advanced: BTreeSet<String> = BTreeSet::from([ADVANCED_GRADE.to_string()]);

    let mut subjects = BTreeMap::new();
    for (catalog, offered_in) in [(&ORDINARY_SUBJECTS[..], &ordinary), (&ADVANCED_SUBJECTS[..], &advanced)] {
        for (id, name, icon) in catalog {
            subjects.insert(
                id.to_string(),
                Subject {
                    name: name.to_string(),
                    icon: icon.to_string(),
                    grades: offered_in.clone(),
                },
            );
        }
    }

    CatalogState {
        grades,
        subjects,
        resources: BTreeMap::new(),
        videos: BTreeMap::new(),
        settings: Settings {
            last_updated: Some(Utc::now()),
            ..Settings::default()
        },
        uploads: Vec::new(),
    }
}
