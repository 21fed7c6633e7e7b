use super::{Database, GradedCriterion};
use crate::error::DraftmarkError;
use crate::model::GradingState;

fn seed_assignment_and_template(db: &Database) -> (i64, i64) {
    let assignment = db
        .create_assignment("Persuasive Essay", Some("Argue a position"), None)
        .unwrap();
    let template = db.create_template("Essay Rubric", Some("ms-jones")).unwrap();
    (assignment.id, template.id)
}

#[test]
fn test_schema_version_recorded() {
    let db = Database::open_in_memory().unwrap();
    assert_eq!(db.get_schema_version().unwrap(), 1);
}

#[test]
fn test_open_creates_db_file() {
    let dir = tempfile::tempdir().unwrap();
    {
        let db = Database::open(dir.path()).unwrap();
        db.create_template("t", None).unwrap();
    }
    assert!(dir.path().join(super::DB_FILE).exists());

    // Reopen and read back
    let db = Database::open(dir.path()).unwrap();
    assert_eq!(db.list_templates().unwrap().len(), 1);
}

#[test]
fn test_criterion_rejects_nonpositive_max_score() {
    let db = Database::open_in_memory().unwrap();
    let (_, template_id) = seed_assignment_and_template(&db);

    let err = db.add_criterion(template_id, "Thesis", "clarity", 0).unwrap_err();
    assert!(matches!(err, DraftmarkError::InvalidValue { .. }));
}

#[test]
fn test_criterion_names_unique_per_template() {
    let db = Database::open_in_memory().unwrap();
    let (_, template_id) = seed_assignment_and_template(&db);

    db.add_criterion(template_id, "Thesis", "clarity", 10).unwrap();
    let err = db
        .add_criterion(template_id, "Thesis", "again", 5)
        .unwrap_err();
    assert!(matches!(err, DraftmarkError::InvalidValue { .. }));

    // Same name on a different template is fine
    let other = db.create_template("Other", None).unwrap();
    db.add_criterion(other.id, "Thesis", "clarity", 10).unwrap();
}

#[test]
fn test_example_score_bounded_by_criterion_max() {
    let db = Database::open_in_memory().unwrap();
    let (_, template_id) = seed_assignment_and_template(&db);
    let criterion = db.add_criterion(template_id, "Thesis", "clarity", 10).unwrap();

    db.add_example(criterion.id, "A strong thesis", 9, "Sharp and specific")
        .unwrap();
    let err = db
        .add_example(criterion.id, "Too good", 11, "n/a")
        .unwrap_err();
    assert!(matches!(err, DraftmarkError::InvalidValue { .. }));
}

#[test]
fn test_delete_template_cascades_to_criteria() {
    let db = Database::open_in_memory().unwrap();
    let (_, template_id) = seed_assignment_and_template(&db);
    let criterion = db.add_criterion(template_id, "Thesis", "clarity", 10).unwrap();
    db.add_example(criterion.id, "text", 8, "fb").unwrap();

    db.delete_template(template_id).unwrap();

    assert!(matches!(
        db.find_template(template_id).unwrap_err(),
        DraftmarkError::NotFound { .. }
    ));
    assert!(db.criteria_for_template(template_id).unwrap().is_empty());
    assert!(matches!(
        db.delete_template(template_id).unwrap_err(),
        DraftmarkError::NotFound { .. }
    ));
}

#[test]
fn test_version_numbers_increase_without_gaps() {
    let db = Database::open_in_memory().unwrap();
    let (assignment_id, template_id) = seed_assignment_and_template(&db);

    for expected in 1..=4 {
        let version = db.create_new_version(assignment_id, template_id).unwrap();
        assert_eq!(version.version_number, expected);
    }
}

#[test]
fn test_at_most_one_active_version() {
    let db = Database::open_in_memory().unwrap();
    let (assignment_id, template_id) = seed_assignment_and_template(&db);

    let v1 = db.create_new_version(assignment_id, template_id).unwrap();
    let v2 = db.create_new_version(assignment_id, template_id).unwrap();

    let versions = db.list_versions(assignment_id).unwrap();
    let active: Vec<_> = versions.iter().filter(|v| v.is_active).collect();
    assert_eq!(active.len(), 1);
    assert_eq!(active[0].id, v2.id);

    // Re-activate the first version
    db.set_active_version(v1.id, assignment_id).unwrap();
    let versions = db.list_versions(assignment_id).unwrap();
    let active: Vec<_> = versions.iter().filter(|v| v.is_active).collect();
    assert_eq!(active.len(), 1);
    assert_eq!(active[0].id, v1.id);
}

#[test]
fn test_set_active_version_idempotent() {
    let db = Database::open_in_memory().unwrap();
    let (assignment_id, template_id) = seed_assignment_and_template(&db);
    let v1 = db.create_new_version(assignment_id, template_id).unwrap();

    db.set_active_version(v1.id, assignment_id).unwrap();
    db.set_active_version(v1.id, assignment_id).unwrap();

    let versions = db.list_versions(assignment_id).unwrap();
    let active: Vec<_> = versions.iter().filter(|v| v.is_active).collect();
    assert_eq!(active.len(), 1);
    assert_eq!(active[0].id, v1.id);
}

#[test]
fn test_activation_scoped_to_assignment() {
    let db = Database::open_in_memory().unwrap();
    let (assignment_a, template_id) = seed_assignment_and_template(&db);
    let assignment_b = db.create_assignment("Second", None, None).unwrap().id;

    let va = db.create_new_version(assignment_a, template_id).unwrap();
    let vb = db.create_new_version(assignment_b, template_id).unwrap();

    // Activating a version of B must not disturb A's active version
    db.set_active_version(vb.id, assignment_b).unwrap();
    let active_a = db.find_active_version(assignment_a).unwrap().unwrap();
    assert_eq!(active_a.id, va.id);

    // A version cannot be activated under a different assignment
    let err = db.set_active_version(va.id, assignment_b).unwrap_err();
    assert!(matches!(err, DraftmarkError::NotFound { .. }));
}

#[test]
fn test_create_version_requires_assignment_and_template() {
    let db = Database::open_in_memory().unwrap();
    let (assignment_id, template_id) = seed_assignment_and_template(&db);

    assert!(matches!(
        db.create_new_version(999, template_id).unwrap_err(),
        DraftmarkError::NotFound { .. }
    ));
    assert!(matches!(
        db.create_new_version(assignment_id, 999).unwrap_err(),
        DraftmarkError::NotFound { .. }
    ));
}

#[test]
fn test_find_active_version_none_when_unbound() {
    let db = Database::open_in_memory().unwrap();
    let (assignment_id, _) = seed_assignment_and_template(&db);
    assert!(db.find_active_version(assignment_id).unwrap().is_none());
}

#[test]
fn test_submission_requires_existing_assignment_and_student() {
    let db = Database::open_in_memory().unwrap();
    let (assignment_id, _) = seed_assignment_and_template(&db);
    let student = db.create_student("Ada").unwrap();

    db.create_submission(assignment_id, student.id, 1, "My essay").unwrap();
    assert!(matches!(
        db.create_submission(999, student.id, 1, "x").unwrap_err(),
        DraftmarkError::NotFound { .. }
    ));
    assert!(matches!(
        db.create_submission(assignment_id, 999, 1, "x").unwrap_err(),
        DraftmarkError::NotFound { .. }
    ));
}

#[test]
fn test_submission_queries_by_assignment_and_student() {
    let db = Database::open_in_memory().unwrap();
    let (assignment_a, _) = seed_assignment_and_template(&db);
    let assignment_b = db.create_assignment("Second", None, None).unwrap().id;
    let ada = db.create_student("Ada").unwrap();
    let ben = db.create_student("Ben").unwrap();

    db.create_submission(assignment_a, ada.id, 1, "a1").unwrap();
    db.create_submission(assignment_a, ben.id, 1, "b1").unwrap();
    db.create_submission(assignment_b, ada.id, 1, "a2").unwrap();

    assert_eq!(db.submissions_for_assignment(assignment_a).unwrap().len(), 2);
    assert_eq!(db.submissions_for_assignment(assignment_b).unwrap().len(), 1);

    let adas = db.submissions_for_student(ada.id).unwrap();
    assert_eq!(adas.len(), 2);
    assert!(adas.iter().all(|s| s.student_id == ada.id));
}

#[test]
fn test_latest_draft_picks_highest_number() {
    let db = Database::open_in_memory().unwrap();
    let (assignment_id, _) = seed_assignment_and_template(&db);
    let student = db.create_student("Ada").unwrap();

    db.create_submission(assignment_id, student.id, 1, "draft one").unwrap();
    let second = db
        .create_submission(assignment_id, student.id, 2, "draft two")
        .unwrap();

    let latest = db.latest_draft(assignment_id, student.id).unwrap().unwrap();
    assert_eq!(latest.id, second.id);
    assert_eq!(latest.draft_number, 2);
}

#[test]
fn test_replace_feedback_set_replaces_and_marks_graded() {
    let db = Database::open_in_memory().unwrap();
    let (assignment_id, template_id) = seed_assignment_and_template(&db);
    let c1 = db.add_criterion(template_id, "Thesis", "clarity", 10).unwrap();
    let c2 = db.add_criterion(template_id, "Structure", "flow", 5).unwrap();
    let version = db.create_new_version(assignment_id, template_id).unwrap();
    let student = db.create_student("Ada").unwrap();
    let submission = db
        .create_submission(assignment_id, student.id, 1, "My essay")
        .unwrap();

    let first_pass = vec![
        GradedCriterion { criterion_id: c1.id, score: 6, feedback: "Vague".to_string() },
        GradedCriterion { criterion_id: c2.id, score: 3, feedback: "Okay".to_string() },
    ];
    db.replace_feedback_set(submission.id, version.id, &first_pass).unwrap();

    let reloaded = db.find_submission(submission.id).unwrap();
    assert_eq!(reloaded.grading_state, GradingState::Graded);
    // Draft number untouched by grading
    assert_eq!(reloaded.draft_number, 1);

    let second_pass = vec![
        GradedCriterion { criterion_id: c1.id, score: 8, feedback: "Better".to_string() },
        GradedCriterion { criterion_id: c2.id, score: 4, feedback: "Good".to_string() },
    ];
    db.replace_feedback_set(submission.id, version.id, &second_pass).unwrap();

    let rows = db
        .feedback_for_submission_version(submission.id, version.id)
        .unwrap();
    assert_eq!(rows.len(), 2);
    let scores: Vec<i64> = rows.iter().map(|r| r.score).collect();
    assert_eq!(scores, vec![8, 4]);
    assert_eq!(db.get_feedback_count().unwrap(), 2);
}

#[test]
fn test_feedback_history_preserved_across_versions() {
    let db = Database::open_in_memory().unwrap();
    let (assignment_id, template_id) = seed_assignment_and_template(&db);
    let c1 = db.add_criterion(template_id, "Thesis", "clarity", 10).unwrap();
    let v1 = db.create_new_version(assignment_id, template_id).unwrap();
    let v2 = db.create_new_version(assignment_id, template_id).unwrap();
    let student = db.create_student("Ada").unwrap();
    let submission = db
        .create_submission(assignment_id, student.id, 1, "My essay")
        .unwrap();

    let pass = |score| vec![GradedCriterion {
        criterion_id: c1.id,
        score,
        feedback: "note".to_string(),
    }];
    db.replace_feedback_set(submission.id, v1.id, &pass(5)).unwrap();
    db.replace_feedback_set(submission.id, v2.id, &pass(7)).unwrap();

    // Rows under the superseded version survive
    let old_rows = db.feedback_for_submission_version(submission.id, v1.id).unwrap();
    assert_eq!(old_rows.len(), 1);
    assert_eq!(old_rows[0].score, 5);

    let latest = db.latest_graded_version(submission.id).unwrap();
    assert_eq!(latest, Some(v2.id));
}

#[test]
fn test_review_preserves_ai_feedback() {
    let db = Database::open_in_memory().unwrap();
    let (assignment_id, template_id) = seed_assignment_and_template(&db);
    let c1 = db.add_criterion(template_id, "Thesis", "clarity", 10).unwrap();
    let version = db.create_new_version(assignment_id, template_id).unwrap();
    let student = db.create_student("Ada").unwrap();
    let submission = db
        .create_submission(assignment_id, student.id, 1, "My essay")
        .unwrap();

    db.replace_feedback_set(
        submission.id,
        version.id,
        &[GradedCriterion {
            criterion_id: c1.id,
            score: 6,
            feedback: "Vague thesis".to_string(),
        }],
    )
    .unwrap();

    let rows = db.feedback_for_submission_version(submission.id, version.id).unwrap();
    let reviewed = db
        .review_feedback(rows[0].feedback_id, 9, "Actually excellent")
        .unwrap();

    assert_eq!(reviewed.score, 9);
    assert_eq!(reviewed.teacher_feedback.as_deref(), Some("Actually excellent"));
    assert_eq!(reviewed.ai_feedback, "Vague thesis");
}

#[test]
fn test_review_rejects_out_of_range_score() {
    let db = Database::open_in_memory().unwrap();
    let (assignment_id, template_id) = seed_assignment_and_template(&db);
    let c1 = db.add_criterion(template_id, "Thesis", "clarity", 10).unwrap();
    let version = db.create_new_version(assignment_id, template_id).unwrap();
    let student = db.create_student("Ada").unwrap();
    let submission = db
        .create_submission(assignment_id, student.id, 1, "My essay")
        .unwrap();

    db.replace_feedback_set(
        submission.id,
        version.id,
        &[GradedCriterion {
            criterion_id: c1.id,
            score: 6,
            feedback: "ok".to_string(),
        }],
    )
    .unwrap();

    let rows = db.feedback_for_submission_version(submission.id, version.id).unwrap();
    let err = db.review_feedback(rows[0].feedback_id, 11, "too high").unwrap_err();
    assert!(matches!(err, DraftmarkError::InvalidValue { .. }));
}
