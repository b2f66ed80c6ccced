//! Onboarding checklist state and the step state machine that drives it.
//!
//! Each tech stack has a fixed, ordered list of steps. A step can only be
//! completed once every earlier step of its stack is complete, and a
//! completed step never goes back to `false` except through an explicit
//! reset of the whole state.

use serde::{Deserialize, Deserializer, Serialize};
use std::collections::BTreeSet;
use std::fmt;
use std::str::FromStr;

pub const NODEJS_STEPS: [&str; 5] = ["credentials", "install", "initialize", "integrate", "handle"];
pub const NEXTJS_STEPS: [&str; 2] = ["install", "integrate"];

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TechStack {
    Nodejs,
    Nextjs,
}

impl TechStack {
    pub const ALL: [TechStack; 2] = [TechStack::Nodejs, TechStack::Nextjs];

    pub fn step_order(self) -> &'static [&'static str] {
        match self {
            TechStack::Nodejs => &NODEJS_STEPS,
            TechStack::Nextjs => &NEXTJS_STEPS,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            TechStack::Nodejs => "nodejs",
            TechStack::Nextjs => "nextjs",
        }
    }
}

impl fmt::Display for TechStack {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TechStack {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "nodejs" => Ok(TechStack::Nodejs),
            "nextjs" => Ok(TechStack::Nextjs),
            other => Err(format!("Unknown tech stack: {}", other)),
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct NodejsSteps {
    pub credentials: bool,
    pub install: bool,
    pub initialize: bool,
    pub integrate: bool,
    pub handle: bool,
}

impl NodejsSteps {
    fn flag_mut(&mut self, step: &str) -> Option<&mut bool> {
        match step {
            "credentials" => Some(&mut self.credentials),
            "install" => Some(&mut self.install),
            "initialize" => Some(&mut self.initialize),
            "integrate" => Some(&mut self.integrate),
            "handle" => Some(&mut self.handle),
            _ => None,
        }
    }

    fn flags(&self) -> [bool; 5] {
        [
            self.credentials,
            self.install,
            self.initialize,
            self.integrate,
            self.handle,
        ]
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct NextjsSteps {
    pub install: bool,
    pub integrate: bool,
}

impl NextjsSteps {
    fn flag_mut(&mut self, step: &str) -> Option<&mut bool> {
        match step {
            "install" => Some(&mut self.install),
            "integrate" => Some(&mut self.integrate),
            _ => None,
        }
    }

    fn flags(&self) -> [bool; 2] {
        [self.install, self.integrate]
    }
}

/// `null` and absent values both read as the type's default.
fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct OnboardingState {
    #[serde(deserialize_with = "null_as_default")]
    pub selected_tech_stacks: BTreeSet<TechStack>,
    #[serde(deserialize_with = "null_as_default")]
    pub nodejs_steps: NodejsSteps,
    #[serde(deserialize_with = "null_as_default")]
    pub nextjs_steps: NextjsSteps,
    #[serde(deserialize_with = "null_as_default")]
    pub completed_tech_stacks: BTreeSet<TechStack>,
    pub last_screen: Option<String>,
}

/// Outcome of asking the state machine to complete one step.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum StepTransition {
    Applied,
    /// Step was already complete; nothing changed.
    AlreadyComplete,
    /// An earlier step of the same stack is still open; nothing changed.
    Blocked { waiting_on: &'static str },
    UnknownStep,
}

impl StepTransition {
    pub fn changed_state(&self) -> bool {
        matches!(self, StepTransition::Applied)
    }
}

impl OnboardingState {
    /// Step flags of `stack`, in the stack's fixed order.
    pub fn step_flags(&self, stack: TechStack) -> Vec<bool> {
        match stack {
            TechStack::Nodejs => self.nodejs_steps.flags().to_vec(),
            TechStack::Nextjs => self.nextjs_steps.flags().to_vec(),
        }
    }

    pub fn stack_satisfied(&self, stack: TechStack) -> bool {
        self.step_flags(stack).iter().all(|done| *done)
    }

    pub fn select_stacks<I>(&mut self, stacks: I)
    where
        I: IntoIterator<Item = TechStack>,
    {
        self.selected_tech_stacks = stacks.into_iter().collect();
    }

    pub fn mark_step(&mut self, stack: TechStack, step: &str) -> StepTransition {
        let order = stack.step_order();
        let Some(index) = order.iter().position(|candidate| *candidate == step) else {
            return StepTransition::UnknownStep;
        };

        let flags = self.step_flags(stack);
        if flags[index] {
            return StepTransition::AlreadyComplete;
        }

        if let Some(open) = order[..index]
            .iter()
            .zip(flags.iter())
            .find(|(_, done)| !**done)
            .map(|(name, _)| *name)
        {
            return StepTransition::Blocked { waiting_on: open };
        }

        let flag = match stack {
            TechStack::Nodejs => self.nodejs_steps.flag_mut(step),
            TechStack::Nextjs => self.nextjs_steps.flag_mut(step),
        };
        match flag {
            Some(flag) => {
                *flag = true;
                StepTransition::Applied
            }
            None => StepTransition::UnknownStep,
        }
    }

    /// Fold every selected stack that is fully done into
    /// `completed_tech_stacks` when onboarding counts as complete.
    pub fn record_completion(&mut self, completed: bool) {
        if completed {
            self.record_satisfied_stacks();
        }
    }

    /// Add every selected stack whose steps are all done to
    /// `completed_tech_stacks`, whatever the completion flag says.
    pub fn record_satisfied_stacks(&mut self) {
        let satisfied: Vec<TechStack> = self
            .selected_tech_stacks
            .iter()
            .copied()
            .filter(|stack| self.stack_satisfied(*stack))
            .collect();
        self.completed_tech_stacks.extend(satisfied);
    }

    /// Apply a client-submitted state as a series of validated transitions.
    ///
    /// Stack selection is replaced, `last_screen` is replaced when present,
    /// and every step marked `true` in `incoming` is attempted in stack
    /// order. `false` never clears a step. Returns the number of steps that
    /// actually changed.
    pub fn merge_from(&mut self, incoming: &OnboardingState) -> usize {
        self.selected_tech_stacks = incoming.selected_tech_stacks.clone();
        if incoming.last_screen.is_some() {
            self.last_screen = incoming.last_screen.clone();
        }

        let mut applied = 0;
        for stack in TechStack::ALL {
            let wanted = incoming.step_flags(stack);
            for (step, want) in stack.step_order().iter().zip(wanted) {
                if want && self.mark_step(stack, step).changed_state() {
                    applied += 1;
                }
            }
        }
        applied
    }
}

/// Onboarding is complete when at least one stack is selected and every
/// selected stack has all of its steps done. Unselected stacks never block.
pub fn compute_completion(state: &OnboardingState) -> bool {
    !state.selected_tech_stacks.is_empty()
        && TechStack::ALL
            .iter()
            .all(|stack| !state.selected_tech_stacks.contains(stack) || state.stack_satisfied(*stack))
}

/// What the API hands back for a company's onboarding row.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct OnboardingProgress {
    #[serde(flatten)]
    pub state: OnboardingState,
    pub completed: bool,
}
