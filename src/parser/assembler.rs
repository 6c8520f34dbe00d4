use super::grammar::{RestSpec, Segment};
use crate::models::{Category, DayContext, Quantity, Workout, WorkoutStep, ZoneSpec};

/// Expands resolved segments into the flat step list of a `Workout`.
#[derive(Debug, Default, Clone, Copy)]
pub struct WorkoutAssembler;

impl WorkoutAssembler {
    pub fn assemble(
        &self,
        day: &DayContext,
        category: Category,
        title: &str,
        description: &str,
        segments: &[Segment<ZoneSpec>],
    ) -> Workout {
        Workout::new(day, category, title, description, self.steps(segments))
    }

    /// Rest goes between repetitions and between back-to-back repeat
    /// blocks, never first or last.
    pub fn steps(&self, segments: &[Segment<ZoneSpec>]) -> Vec<WorkoutStep> {
        let mut steps = Vec::new();

        for (index, segment) in segments.iter().enumerate() {
            match segment {
                Segment::Repeat {
                    reps,
                    work,
                    rest,
                    zone,
                } => {
                    let next_is_repeat = matches!(segments.get(index + 1), Some(Segment::Repeat { .. }));
                    for rep in 0..*reps {
                        steps.push(WorkoutStep::work(*work, zone.zone_for_rep(rep, *reps)));

                        let last_rep = rep + 1 == *reps;
                        if !last_rep || next_is_repeat {
                            steps.extend(rest_step(rest));
                        }
                    }
                }
                Segment::Steady {
                    quantity,
                    zone,
                    note,
                } => {
                    let step = WorkoutStep::work(*quantity, zone.primary());
                    steps.push(match note {
                        Some(note) => step.with_note(note.clone()),
                        None => step,
                    });
                }
                Segment::Placeholder => steps.push(WorkoutStep::placeholder()),
            }
        }

        while steps.last().is_some_and(WorkoutStep::is_rest) {
            steps.pop();
        }
        steps
    }
}

fn rest_step(rest: &RestSpec) -> Option<WorkoutStep> {
    match rest {
        RestSpec::Timed(0) | RestSpec::Continuous => None,
        RestSpec::Timed(seconds) => Some(WorkoutStep::rest(Quantity::DurationSeconds(*seconds))),
        RestSpec::Described(text) => Some(WorkoutStep::rest(Quantity::Untimed).with_note(text.clone())),
    }
}
