use crate::GameClock;

impl GameClock {
    pub fn from_total_seconds(total: u64) -> Self {
        Self {
            minutes_elapsed: total / 60,
            seconds_elapsed: total % 60,
        }
    }

    pub fn total_seconds(self) -> u64 {
        self.minutes_elapsed * 60 + self.seconds_elapsed
    }

    /// Advances by one second, carrying into minutes at 60.
    pub fn advance(&mut self) {
        self.seconds_elapsed += 1;
        if self.seconds_elapsed >= 60 {
            self.seconds_elapsed = 0;
            self.minutes_elapsed += 1;
        }
    }
}

impl std::fmt::Display for GameClock {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}:{:02}", self.minutes_elapsed, self.seconds_elapsed)
    }
}
