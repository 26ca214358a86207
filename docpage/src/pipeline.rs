//! Typed left-to-right composition of fallible steps.

type Step<'a, I, O, E> = Box<dyn Fn(I) -> Result<O, E> + 'a>;

/// A chain of steps from `I` to `O`. Running it stops at the first step
/// that fails and returns that error.
pub struct Pipeline<'a, I, O, E> {
    steps: Step<'a, I, O, E>,
}

impl<'a, I: 'a, E: 'a> Pipeline<'a, I, I, E> {
    /// The empty pipeline, which returns its input.
    pub fn new() -> Self {
        Pipeline {
            steps: Box::new(Ok::<I, E>),
        }
    }
}

impl<'a, I: 'a, E: 'a> Default for Pipeline<'a, I, I, E> {
    fn default() -> Self {
        Self::new()
    }
}

impl<'a, I: 'a, O: 'a, E: 'a> Pipeline<'a, I, O, E> {
    /// Append a fallible step.
    pub fn then<P, F>(self, name: &'static str, step: F) -> Pipeline<'a, I, P, E>
    where
        P: 'a,
        F: Fn(O) -> Result<P, E> + 'a,
    {
        let previous = self.steps;
        Pipeline {
            steps: Box::new(move |input| {
                let value = previous(input)?;
                let result = step(value);
                tracing::debug!(step = name, ok = result.is_ok(), "pipeline step");
                result
            }),
        }
    }

    /// Append a step that cannot fail.
    pub fn map<P, F>(self, name: &'static str, step: F) -> Pipeline<'a, I, P, E>
    where
        P: 'a,
        F: Fn(O) -> P + 'a,
    {
        self.then(name, move |value| Ok(step(value)))
    }

    pub fn run(&self, input: I) -> Result<O, E> {
        (self.steps)(input)
    }
}
