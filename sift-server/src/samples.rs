//! Built-in claims for trying the checker without typing one.

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SampleClaim {
    pub title: &'static str,
    pub content: &'static str,
    pub source: &'static str,
}

pub const SAMPLES: [SampleClaim; 3] = [
    SampleClaim {
        title: "Celebrity retirement",
        content: "Famous actor Zhang suddenly announced on Weibo that he is permanently retiring from the entertainment industry due to health reasons. Fans expressed shock and sadness. The news quickly topped the hot search list after being posted.",
        source: "Weibo Hot Search",
    },
    SampleClaim {
        title: "Pension recertification",
        content: "National Social Security Administration issued an urgent notice: All elderly people over 60 must re-certify their pension qualifications through a mobile app before the end of the month, otherwise pension payments will be suspended.",
        source: "WeChat group circulation",
    },
    SampleClaim {
        title: "Miracle cure",
        content: "Latest research from Harvard University found that eating broccoli continuously for 30 days can completely cure early-stage cancer without any other treatment. The research has been nominated for the Nobel Prize in Medicine.",
        source: "Health and Wellness public account",
    },
];

/// One-based lookup, matching the `?sample=N` links.
pub fn sample(number: usize) -> Option<&'static SampleClaim> {
    number.checked_sub(1).and_then(|i| SAMPLES.get(i))
}
