/// Summary statistics over one generation's fitness scores.
///
/// Fitness distributions are small (one value per agent) and heavy-tailed,
/// since a single lucky run can dominate the mean, so the median and
/// standard deviation are reported alongside the extremes.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FitnessStats {
    /// Highest fitness in the generation.
    pub best: f32,
    /// Lowest fitness in the generation.
    pub worst: f32,
    /// Arithmetic mean.
    pub mean: f32,
    /// Median (upper element for even counts).
    pub median: f32,
    /// Population standard deviation.
    pub std_dev: f32,
}

impl FitnessStats {
    /// Computes statistics over the given scores.
    ///
    /// Returns `None` for an empty generation; the caller decides what an
    /// absent distribution means (usually "no agent reported fitness").
    ///
    /// # Examples
    ///
    /// ```
    /// use neurodrone_stats::descriptive::FitnessStats;
    ///
    /// let stats = FitnessStats::from_values([5.0, 2.0, 4.0, 1.0, 3.0]).unwrap();
    /// assert_eq!(stats.best, 5.0);
    /// assert_eq!(stats.worst, 1.0);
    /// assert_eq!(stats.mean, 3.0);
    /// assert_eq!(stats.median, 3.0);
    ///
    /// assert!(FitnessStats::from_values([]).is_none());
    /// ```
    #[expect(clippy::cast_precision_loss)]
    #[must_use]
    pub fn from_values<I>(values: I) -> Option<Self>
    where
        I: IntoIterator<Item = f32>,
    {
        let mut sorted = values.into_iter().collect::<Vec<_>>();
        sorted.sort_by(f32::total_cmp);

        let worst = *sorted.first()?;
        let best = *sorted.last()?;
        let n = sorted.len() as f32;
        let mean = sorted.iter().sum::<f32>() / n;
        let median = sorted[sorted.len() / 2];
        let variance = sorted.iter().map(|v| (v - mean).powi(2)).sum::<f32>() / n;

        Some(Self {
            best,
            worst,
            mean,
            median,
            std_dev: variance.sqrt(),
        })
    }
}
