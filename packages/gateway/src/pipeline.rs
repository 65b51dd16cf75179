use std::future::Future;

/// Ordered fan-out stage with a concurrency bound of one.
///
/// Items run strictly in submission order and each one starts only after the
/// previous one finished, so the stage's cost grows linearly with the number
/// of items. The contract is all-or-nothing: the first failing item ends the
/// stage, later items are never started and no partial output is returned.
#[derive(Debug, Clone, Copy, Default)]
pub struct OrderedPipeline;

impl OrderedPipeline {
    pub const CONCURRENCY: usize = 1;

    pub async fn run<I, T, E, F, Fut>(&self, items: I, mut stage: F) -> Result<Vec<T>, E>
    where
        I: IntoIterator,
        F: FnMut(usize, I::Item) -> Fut,
        Fut: Future<Output = Result<T, E>>,
    {
        let items = items.into_iter();
        let mut outputs = Vec::with_capacity(items.size_hint().0);
        for (index, item) in items.enumerate() {
            outputs.push(stage(index, item).await?);
        }
        Ok(outputs)
    }
}
