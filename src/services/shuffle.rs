use rand::{seq::SliceRandom, Rng};

use crate::models::domain::{Question, QuestionType, Quiz};

/// Applies the quiz's randomization flags to a freshly loaded question list.
///
/// Both shuffles are Fisher–Yates (`SliceRandom::shuffle`). Option order is
/// shuffled per multiple-choice question, independently of question order.
pub fn materialize<R>(quiz: &Quiz, mut questions: Vec<Question>, rng: &mut R) -> Vec<Question>
where
    R: Rng + ?Sized,
{
    if quiz.randomize_questions {
        questions.shuffle(rng);
    }

    if quiz.randomize_options {
        questions
            .iter_mut()
            .filter(|q| q.question_type == QuestionType::MultipleChoice)
            .for_each(|q| q.options.shuffle(rng));
    }

    questions
}
