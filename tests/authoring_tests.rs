// tests/authoring_tests.rs

mod common;

use common::spawn_app;
use quiz_engine::{
    EngineError,
    models::{
        attempt::{Attempt, QuestionSet},
        module::CourseModule,
        question::{Difficulty, NewQuestion, QuestionType, QuestionUpdate},
        quiz::{NewQuiz, QuizType, QuizUpdate},
        student::Tier,
    },
    services::{
        authoring::{
            add_question, create_quiz, delete_question, delete_quiz, update_question, update_quiz,
        },
        report::quiz_responses,
        session::{review_attempt, start_attempt},
    },
    store::{AttemptStore, QuestionBank, QuizStore},
};
use uuid::Uuid;

fn true_false(module_id: Uuid, prompt: &str) -> NewQuestion {
    NewQuestion {
        module_id,
        question_type: QuestionType::TrueFalse,
        prompt: prompt.to_string(),
        options: vec!["True".to_string(), "False".to_string()],
        correct_answer: "False".to_string(),
        difficulty: Difficulty::Easy,
    }
}

fn new_quiz(module_id: Uuid, name: &str) -> NewQuiz {
    NewQuiz {
        module_id,
        name: name.to_string(),
        question_count: 1,
        quiz_type: QuizType::TrueFalse,
        time_limit_minutes: 30,
    }
}

#[tokio::test]
async fn duplicate_question_is_conflict() {
    let app = spawn_app(0).await;

    add_question(&app.state, true_false(app.module.id, "The sky is green"))
        .await
        .unwrap();
    let err = add_question(&app.state, true_false(app.module.id, "The sky is green"))
        .await
        .unwrap_err();

    assert!(matches!(err, EngineError::Conflict(_)));
}

#[tokio::test]
async fn question_for_unknown_module_is_not_found() {
    let app = spawn_app(0).await;

    let err = add_question(&app.state, true_false(Uuid::new_v4(), "Orphan"))
        .await
        .unwrap_err();

    assert!(matches!(err, EngineError::NotFound(_)));
}

#[tokio::test]
async fn malformed_question_is_bad_request() {
    let app = spawn_app(0).await;

    let mut payload = true_false(app.module.id, "Wrong options");
    payload.options = vec!["Yes".to_string(), "No".to_string()];
    let err = add_question(&app.state, payload).await.unwrap_err();

    assert!(matches!(err, EngineError::BadRequest(_)));
}

#[tokio::test]
async fn quiz_names_are_unique_per_module() {
    let app = spawn_app(0).await;
    let other = CourseModule::new("Module 2", vec![]);
    app.store.insert_module(other.clone()).await;

    create_quiz(&app.state, new_quiz(app.module.id, "Midterm"))
        .await
        .unwrap();

    let err = create_quiz(&app.state, new_quiz(app.module.id, "Midterm"))
        .await
        .unwrap_err();
    assert!(matches!(err, EngineError::Conflict(_)));

    // Same name in a different module is fine.
    create_quiz(&app.state, new_quiz(other.id, "Midterm"))
        .await
        .unwrap();
}

#[tokio::test]
async fn invalid_quiz_is_bad_request() {
    let app = spawn_app(0).await;

    let mut payload = new_quiz(app.module.id, "Empty");
    payload.question_count = 0;
    let err = create_quiz(&app.state, payload).await.unwrap_err();

    assert!(matches!(err, EngineError::BadRequest(_)));
}

#[tokio::test]
async fn quiz_update_before_any_submission() {
    let app = spawn_app(0).await;
    create_quiz(&app.state, new_quiz(app.module.id, "Final"))
        .await
        .unwrap();
    let quiz = create_quiz(&app.state, new_quiz(app.module.id, "Quiz"))
        .await
        .unwrap();

    let renamed = update_quiz(
        &app.state,
        quiz.id,
        QuizUpdate {
            name: Some("Weekly".to_string()),
            question_count: Some(5),
            ..Default::default()
        },
    )
    .await
    .unwrap();
    assert_eq!(renamed.name, "Weekly");
    assert_eq!(renamed.question_count, 5);

    let stored = app.store.get_quiz(quiz.id).await.unwrap().unwrap();
    assert_eq!(stored.name, "Weekly");

    let err = update_quiz(
        &app.state,
        quiz.id,
        QuizUpdate {
            name: Some("Final".to_string()),
            ..Default::default()
        },
    )
    .await
    .unwrap_err();
    assert!(matches!(err, EngineError::Conflict(_)));

    let err = update_quiz(&app.state, Uuid::new_v4(), QuizUpdate::default())
        .await
        .unwrap_err();
    assert!(matches!(err, EngineError::NotFound(_)));
}

#[tokio::test]
async fn attempted_quiz_is_frozen() {
    let app = spawn_app(0).await;
    let student = app.add_student(Tier::Beginner).await;
    app.add_questions(QuestionType::TrueFalse, Difficulty::Easy, 1).await;
    let quiz = app.add_quiz("Quiz", 1, QuizType::TrueFalse).await;

    app.take_quiz(quiz.id, student, 1).await;

    let err = update_quiz(
        &app.state,
        quiz.id,
        QuizUpdate {
            time_limit_minutes: Some(10),
            ..Default::default()
        },
    )
    .await
    .unwrap_err();
    assert!(matches!(err, EngineError::Conflict(_)));

    let err = delete_quiz(&app.state, quiz.id).await.unwrap_err();
    assert!(matches!(err, EngineError::Conflict(_)));
    assert!(app.store.get_quiz(quiz.id).await.unwrap().is_some());
}

#[tokio::test]
async fn unattempted_quiz_can_be_deleted() {
    let app = spawn_app(0).await;
    let quiz = create_quiz(&app.state, new_quiz(app.module.id, "Draft"))
        .await
        .unwrap();

    delete_quiz(&app.state, quiz.id).await.unwrap();

    assert!(app.store.get_quiz(quiz.id).await.unwrap().is_none());
    let err = delete_quiz(&app.state, quiz.id).await.unwrap_err();
    assert!(matches!(err, EngineError::NotFound(_)));
}

#[tokio::test]
async fn referenced_question_cannot_be_deleted() {
    let app = spawn_app(0).await;
    let student = app.add_student(Tier::Beginner).await;
    let drawn = app.add_questions(QuestionType::TrueFalse, Difficulty::Easy, 1).await;
    let spare = app.add_questions(QuestionType::TrueFalse, Difficulty::Medium, 1).await;
    let quiz = app.add_quiz("Quiz", 1, QuizType::TrueFalse).await;

    // An open attempt is enough to pin its questions.
    start_attempt(&app.state, quiz.id, student).await.unwrap();

    let err = delete_question(&app.state, drawn[0].id).await.unwrap_err();
    assert!(matches!(err, EngineError::Conflict(_)));

    delete_question(&app.state, spare[0].id).await.unwrap();
    assert!(app.store.get_question(spare[0].id).await.unwrap().is_none());

    let err = delete_question(&app.state, spare[0].id).await.unwrap_err();
    assert!(matches!(err, EngineError::NotFound(_)));
}

#[tokio::test]
async fn deleting_quiz_releases_its_questions() {
    let app = spawn_app(0).await;
    let student = app.add_student(Tier::Beginner).await;
    let drawn = app.add_questions(QuestionType::TrueFalse, Difficulty::Easy, 1).await;
    let quiz = app.add_quiz("Quiz", 1, QuizType::TrueFalse).await;

    // Started but never submitted, so the quiz is not frozen.
    start_attempt(&app.state, quiz.id, student).await.unwrap();
    delete_quiz(&app.state, quiz.id).await.unwrap();

    assert_eq!(app.store.attempt_count(student, quiz.id).await, 0);
    delete_question(&app.state, drawn[0].id).await.unwrap();
}

#[tokio::test]
async fn store_rechecks_freeze_on_write() {
    let app = spawn_app(0).await;
    let student = app.add_student(Tier::Beginner).await;
    app.add_questions(QuestionType::TrueFalse, Difficulty::Easy, 1).await;
    let quiz = app.add_quiz("Quiz", 1, QuizType::TrueFalse).await;

    // Copy loaded before anyone submitted.
    let mut stale = app.store.get_quiz(quiz.id).await.unwrap().unwrap();
    assert!(!stale.is_locked());

    app.take_quiz(quiz.id, student, 1).await;

    stale.time_limit_minutes = 5;
    let err = app.store.update_quiz(&stale).await.unwrap_err();
    assert!(matches!(err, EngineError::Conflict(_)));

    let err = app.store.delete_quiz(quiz.id).await.unwrap_err();
    assert!(matches!(err, EngineError::Conflict(_)));

    let stored = app.store.get_quiz(quiz.id).await.unwrap().unwrap();
    assert_eq!(stored.time_limit_minutes, 30);
    assert!(app.store.find_attempt(student, quiz.id).await.unwrap().unwrap().is_closed());
}

#[tokio::test]
async fn store_rechecks_question_use_on_delete() {
    let app = spawn_app(0).await;
    let student = app.add_student(Tier::Beginner).await;
    let drawn = app.add_questions(QuestionType::TrueFalse, Difficulty::Easy, 1).await;
    let quiz = app.add_quiz("Quiz", 1, QuizType::TrueFalse).await;

    start_attempt(&app.state, quiz.id, student).await.unwrap();

    let err = app.store.delete_question(drawn[0].id).await.unwrap_err();
    assert!(matches!(err, EngineError::Conflict(_)));
    assert!(app.store.get_question(drawn[0].id).await.unwrap().is_some());
}

#[tokio::test]
async fn attempt_over_deleted_question_is_not_stored() {
    let app = spawn_app(0).await;
    let student = app.add_student(Tier::Beginner).await;
    let bank = app.add_questions(QuestionType::TrueFalse, Difficulty::Easy, 1).await;
    let quiz = app.add_quiz("Quiz", 2, QuizType::TrueFalse).await;

    // One id was drawn and then deleted before the attempt was written.
    let attempt = Attempt::open(
        student,
        quiz.id,
        QuestionSet::new(vec![bank[0].id, Uuid::new_v4()]),
    );
    let err = app.store.replace_attempt(&attempt).await.unwrap_err();

    assert!(matches!(err, EngineError::Conflict(_)));
    assert_eq!(app.store.attempt_count(student, quiz.id).await, 0);
}

#[tokio::test]
async fn question_text_can_be_edited() {
    let app = spawn_app(0).await;
    let student = app.add_student(Tier::Beginner).await;
    let bank = app.add_questions(QuestionType::TrueFalse, Difficulty::Easy, 1).await;
    let quiz = app.add_quiz("Quiz", 1, QuizType::TrueFalse).await;
    app.take_quiz(quiz.id, student, 1).await;

    let edited = update_question(
        &app.state,
        bank[0].id,
        QuestionUpdate {
            prompt: Some("Reworded statement".to_string()),
            difficulty: Some(Difficulty::Medium),
            ..Default::default()
        },
    )
    .await
    .unwrap();
    assert_eq!(edited.id, bank[0].id);
    assert_eq!(edited.correct_answer, "True");

    // Review shows the bank's current text.
    let review = review_attempt(&app.state, quiz.id, student).await.unwrap();
    assert_eq!(review.questions[0].prompt, "Reworded statement");
    assert_eq!(review.questions[0].difficulty, Difficulty::Medium);
}

#[tokio::test]
async fn answer_key_frozen_while_question_is_held() {
    let app = spawn_app(0).await;
    let student = app.add_student(Tier::Beginner).await;
    let bank = app.add_questions(QuestionType::TrueFalse, Difficulty::Easy, 1).await;
    let quiz = app.add_quiz("Quiz", 1, QuizType::TrueFalse).await;

    let flip = || QuestionUpdate {
        correct_answer: Some("False".to_string()),
        ..Default::default()
    };

    // Open attempt.
    start_attempt(&app.state, quiz.id, student).await.unwrap();
    let err = update_question(&app.state, bank[0].id, flip()).await.unwrap_err();
    assert!(matches!(err, EngineError::Conflict(_)));

    // Closed attempt.
    app.take_quiz(quiz.id, student, 1).await;
    let err = update_question(&app.state, bank[0].id, flip()).await.unwrap_err();
    assert!(matches!(err, EngineError::Conflict(_)));

    let stored = app.store.get_question(bank[0].id).await.unwrap().unwrap();
    assert_eq!(stored.correct_answer, "True");
}

#[tokio::test]
async fn answer_key_editable_before_any_attempt() {
    let app = spawn_app(0).await;
    let bank = app.add_questions(QuestionType::MultipleChoice, Difficulty::Easy, 1).await;

    let edited = update_question(
        &app.state,
        bank[0].id,
        QuestionUpdate {
            correct_answer: Some("C".to_string()),
            ..Default::default()
        },
    )
    .await
    .unwrap();
    assert_eq!(edited.correct_answer, "C");

    let stored = app.store.get_question(bank[0].id).await.unwrap().unwrap();
    assert_eq!(stored.correct_answer, "C");
}

#[tokio::test]
async fn question_edit_rejections() {
    let app = spawn_app(0).await;
    let bank = app.add_questions(QuestionType::MultipleChoice, Difficulty::Easy, 2).await;

    let err = update_question(&app.state, Uuid::new_v4(), QuestionUpdate::default())
        .await
        .unwrap_err();
    assert!(matches!(err, EngineError::NotFound(_)));

    let err = update_question(
        &app.state,
        bank[0].id,
        QuestionUpdate {
            correct_answer: Some("E".to_string()),
            ..Default::default()
        },
    )
    .await
    .unwrap_err();
    assert!(matches!(err, EngineError::BadRequest(_)));

    // Retagging onto another question's prompt.
    let err = update_question(
        &app.state,
        bank[0].id,
        QuestionUpdate {
            prompt: Some(bank[1].prompt.clone()),
            ..Default::default()
        },
    )
    .await
    .unwrap_err();
    assert!(matches!(err, EngineError::Conflict(_)));
}

#[tokio::test]
async fn quiz_responses_list_submissions() {
    let app = spawn_app(0).await;
    app.add_questions(QuestionType::TrueFalse, Difficulty::Easy, 2).await;
    let quiz = app.add_quiz("Quiz", 2, QuizType::TrueFalse).await;
    let first = app.add_student(Tier::Beginner).await;
    let second = app.add_student(Tier::Beginner).await;
    let pending = app.add_student(Tier::Beginner).await;

    let empty = quiz_responses(&app.state, quiz.id).await.unwrap();
    assert!(empty.responses.is_empty());

    app.take_quiz(quiz.id, first, 2).await;
    app.take_quiz(quiz.id, second, 1).await;
    start_attempt(&app.state, quiz.id, pending).await.unwrap();

    let listed = quiz_responses(&app.state, quiz.id).await.unwrap();
    assert_eq!(listed.quiz.id, quiz.id);
    assert_eq!(listed.responses.len(), 2);
    assert!(listed.responses.iter().all(|a| a.is_closed()));
    assert!(listed.responses.iter().all(|a| a.student_id != pending));
    assert!(listed.responses[0].completed_at <= listed.responses[1].completed_at);

    let err = quiz_responses(&app.state, Uuid::new_v4()).await.unwrap_err();
    assert!(matches!(err, EngineError::NotFound(_)));
}
