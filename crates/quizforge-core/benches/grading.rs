use criterion::{black_box, criterion_group, criterion_main, Criterion};

use quizforge_core::attempt::Answer;
use quizforge_core::engine::{evaluate_attempt, percentage, points_for_percentage};
use quizforge_core::model::{
    Blank, Difficulty, MatchingPair, Question, QuestionKind, QuestionOption, Quiz, QuizCategory,
    Visibility,
};
use quizforge_core::validator::validate_quiz;
use quizforge_core::SubscriptionTier;

fn make_question(i: usize) -> Question {
    let kind = match i % 4 {
        0 => QuestionKind::MultipleChoice {
            options: ["a", "b", "c", "d"]
                .iter()
                .map(|id| QuestionOption {
                    id: id.to_string(),
                    text: format!("Option {id}"),
                })
                .collect(),
            correct_option_ids: ["a".to_string(), "c".to_string()].into(),
        },
        1 => QuestionKind::Matching {
            pairs: (0..4)
                .map(|p| MatchingPair {
                    id: format!("p{p}"),
                    left: format!("left {p}"),
                    right: format!("right {p}"),
                })
                .collect(),
        },
        2 => QuestionKind::FillInBlank {
            template: "{{blank}} and {{blank}}".into(),
            blanks: vec![
                Blank {
                    id: "b1".into(),
                    correct_answer: "Salt".into(),
                    acceptable_answers: vec!["NaCl".into()],
                },
                Blank {
                    id: "b2".into(),
                    correct_answer: "Pepper".into(),
                    acceptable_answers: vec![],
                },
            ],
        },
        _ => QuestionKind::ShortAnswer {
            correct_answer: "Photosynthesis".into(),
            acceptable_answers: vec!["photo synthesis".into()],
        },
    };
    Question {
        id: format!("q{i}"),
        text: format!("Question {i}"),
        image_url: None,
        time_limit_secs: Some(30),
        kind,
    }
}

fn make_quiz(n: usize) -> Quiz {
    Quiz {
        id: "bench".into(),
        title: "Benchmark quiz".into(),
        description: "Mixed question types".into(),
        category: QuizCategory::Science,
        difficulty: Difficulty::Medium,
        time_limit_minutes: None,
        pass_threshold: 70,
        visibility: Visibility::Public,
        questions: (0..n).map(make_question).collect(),
    }
}

fn make_answers(n: usize) -> Vec<Answer> {
    (0..n)
        .map(|i| {
            let id = format!("q{i}");
            let answer = match i % 4 {
                0 => Answer::selection(id, ["c", "a"]),
                1 => Answer::matching(
                    id,
                    (0..4).map(|p| (format!("left {p}"), format!("right {p}"))),
                ),
                2 => Answer::blanks(id, [("b1", " nacl "), ("b2", "PEPPER")]),
                _ => Answer::text(id, "photosynthesis"),
            };
            answer.elapsed(12)
        })
        .collect()
}

fn bench_evaluate(c: &mut Criterion) {
    let mut group = c.benchmark_group("evaluate_attempt");

    for n in [10, 50, 500] {
        let quiz = make_quiz(n);
        let answers = make_answers(n);
        group.bench_function(format!("questions={n}"), |b| {
            b.iter(|| evaluate_attempt(black_box(&quiz), black_box(&answers)))
        });
    }

    group.finish();
}

fn bench_validate(c: &mut Criterion) {
    let mut group = c.benchmark_group("validate_quiz");
    let quiz = make_quiz(50);

    group.bench_function("free", |b| {
        b.iter(|| validate_quiz(black_box(&quiz), black_box(SubscriptionTier::Free)))
    });

    group.bench_function("premium", |b| {
        b.iter(|| validate_quiz(black_box(&quiz), black_box(SubscriptionTier::Premium)))
    });

    group.finish();
}

fn bench_points(c: &mut Criterion) {
    c.bench_function("points_for_percentage", |b| {
        b.iter(|| {
            (0..=100u32)
                .map(|s| points_for_percentage(percentage(black_box(s), 100)))
                .sum::<u32>()
        })
    });
}

criterion_group!(benches, bench_evaluate, bench_validate, bench_points);
criterion_main!(benches);
