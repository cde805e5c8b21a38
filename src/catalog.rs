use std::fmt;
use std::str::FromStr;

use crate::error::OpenDiggerError;

/// How a resource's JSON body is shaped and rendered.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Shape {
    /// `{"YYYY-MM": value}` rendered as a time series.
    Series(ChartStyle),
    /// `{"avg": {...}, "levels": {...}}` rendered as a two-panel figure.
    ResponseTime,
    /// Per-month values that only make sense for a single month (lists, matrices).
    Snapshot,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChartStyle {
    Line(Palette),
    Bar(Palette),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Palette {
    Red,
    Green,
    Blue,
    Orange,
}

impl Palette {
    pub fn rgb(self) -> (u8, u8, u8) {
        match self {
            Self::Red => (214, 39, 40),
            Self::Green => (44, 160, 44),
            Self::Blue => (31, 119, 180),
            Self::Orange => (255, 127, 14),
        }
    }
}

/// One JSON document under `<base>/<owner>/<repo>/`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Resource {
    /// File stem of the JSON document, also used for the chart file name.
    pub name: &'static str,
    pub label: &'static str,
    pub shape: Shape,
}

const fn series(name: &'static str, label: &'static str, style: ChartStyle) -> Resource {
    Resource {
        name,
        label,
        shape: Shape::Series(style),
    }
}

const fn response_time(name: &'static str, label: &'static str) -> Resource {
    Resource {
        name,
        label,
        shape: Shape::ResponseTime,
    }
}

const fn snapshot(name: &'static str, label: &'static str) -> Resource {
    Resource {
        name,
        label,
        shape: Shape::Snapshot,
    }
}

const RED_LINE: ChartStyle = ChartStyle::Line(Palette::Red);
const GREEN_LINE: ChartStyle = ChartStyle::Line(Palette::Green);
const BLUE_LINE: ChartStyle = ChartStyle::Line(Palette::Blue);

const OPENRANK: &[Resource] = &[series("openrank", "OpenRank", RED_LINE)];
const ACTIVITY: &[Resource] = &[series("activity", "Activity", RED_LINE)];
const ATTENTION: &[Resource] = &[series("attention", "Attention", RED_LINE)];

const ACTIVE_DATES_TIMES: &[Resource] =
    &[snapshot("active_dates_times", "Active dates and times")];
const STARS: &[Resource] = &[series("stars", "Stars", ChartStyle::Bar(Palette::Orange))];
const TECHNICAL_FORK: &[Resource] = &[series("technical_fork", "Technical fork", BLUE_LINE)];
const PARTICIPANTS: &[Resource] = &[series("participants", "Participants", BLUE_LINE)];
const CONTRIBUTORS: &[Resource] = &[
    series("new_contributors", "New contributors", ChartStyle::Bar(Palette::Blue)),
    series("inactive_contributors", "Inactive contributors", ChartStyle::Bar(Palette::Red)),
    snapshot("new_contributors_detail", "New contributor names"),
];
const BUS_FACTOR: &[Resource] = &[
    series("bus_factor", "Bus factor", RED_LINE),
    snapshot("bus_factor_detail", "Bus factor detail"),
];
const ISSUES: &[Resource] = &[
    series("issue_new", "Issues new", BLUE_LINE),
    series("issue_closed", "Issues closed", BLUE_LINE),
    series("issue_comments", "Issue comments", BLUE_LINE),
    response_time("issue_response_time", "Issue response time"),
    response_time("issue_resolution_duration", "Issue resolution duration"),
    response_time("issue_age", "Issue age"),
];
const CODE_CHANGE_LINE: &[Resource] = &[
    series("code_change_lines_add", "Code change lines added", GREEN_LINE),
    series("code_change_lines_remove", "Code change lines removed", GREEN_LINE),
    series("code_change_lines_sum", "Code change lines sum", GREEN_LINE),
];
const PR: &[Resource] = &[
    series("change_requests", "Open PR", BLUE_LINE),
    series("change_requests_accepted", "Accepted PR", BLUE_LINE),
    series("change_requests_reviews", "PR reviews", BLUE_LINE),
    response_time("change_request_response_time", "PR response time"),
    response_time("change_request_resolution_duration", "PR resolution duration"),
];

/// Composite health scores.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Index {
    OpenRank,
    Activity,
    Attention,
}

impl Index {
    pub const ALL: [Index; 3] = [Index::OpenRank, Index::Activity, Index::Attention];

    pub fn name(self) -> &'static str {
        match self {
            Self::OpenRank => "openrank",
            Self::Activity => "activity",
            Self::Attention => "attention",
        }
    }

    pub fn title(self) -> &'static str {
        match self {
            Self::OpenRank => "OpenRank",
            Self::Activity => "Activity",
            Self::Attention => "Attention",
        }
    }

    pub fn resources(self) -> &'static [Resource] {
        match self {
            Self::OpenRank => OPENRANK,
            Self::Activity => ACTIVITY,
            Self::Attention => ATTENTION,
        }
    }
}

impl FromStr for Index {
    type Err = OpenDiggerError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|index| index.name() == s)
            .ok_or_else(|| {
                OpenDiggerError::Usage(format!(
                    "Unknown index '{s}'. Expected one of: {}, all",
                    Self::ALL.map(Self::name).join(", ")
                ))
            })
    }
}

impl fmt::Display for Index {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Granular repository metrics.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Metric {
    ActiveDatesTimes,
    Stars,
    TechnicalFork,
    Participants,
    Contributors,
    BusFactor,
    Issues,
    CodeChangeLine,
    Pr,
}

impl Metric {
    pub const ALL: [Metric; 9] = [
        Metric::ActiveDatesTimes,
        Metric::Stars,
        Metric::TechnicalFork,
        Metric::Participants,
        Metric::Contributors,
        Metric::BusFactor,
        Metric::Issues,
        Metric::CodeChangeLine,
        Metric::Pr,
    ];

    /// Order used by `--metric all`. Bus factor is only available on request.
    pub const COMPOSITE: [Metric; 8] = [
        Metric::Stars,
        Metric::ActiveDatesTimes,
        Metric::TechnicalFork,
        Metric::Issues,
        Metric::Participants,
        Metric::Contributors,
        Metric::CodeChangeLine,
        Metric::Pr,
    ];

    pub fn name(self) -> &'static str {
        match self {
            Self::ActiveDatesTimes => "active-dates-times",
            Self::Stars => "stars",
            Self::TechnicalFork => "technical_fork",
            Self::Participants => "participants",
            Self::Contributors => "contributors",
            Self::BusFactor => "bus_factor",
            Self::Issues => "issues",
            Self::CodeChangeLine => "code_change_line",
            Self::Pr => "pr",
        }
    }

    pub fn title(self) -> &'static str {
        match self {
            Self::ActiveDatesTimes => "Active dates and times",
            Self::Stars => "Stars",
            Self::TechnicalFork => "Technical fork",
            Self::Participants => "Participants",
            Self::Contributors => "Contributors",
            Self::BusFactor => "Bus factor",
            Self::Issues => "Issues",
            Self::CodeChangeLine => "Code change lines",
            Self::Pr => "Pull requests",
        }
    }

    pub fn resources(self) -> &'static [Resource] {
        match self {
            Self::ActiveDatesTimes => ACTIVE_DATES_TIMES,
            Self::Stars => STARS,
            Self::TechnicalFork => TECHNICAL_FORK,
            Self::Participants => PARTICIPANTS,
            Self::Contributors => CONTRIBUTORS,
            Self::BusFactor => BUS_FACTOR,
            Self::Issues => ISSUES,
            Self::CodeChangeLine => CODE_CHANGE_LINE,
            Self::Pr => PR,
        }
    }
}

impl FromStr for Metric {
    type Err = OpenDiggerError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|metric| metric.name() == s)
            .ok_or_else(|| {
                OpenDiggerError::Usage(format!(
                    "Unknown metric '{s}'. Expected one of: {}, all",
                    Self::ALL.map(Self::name).join(", ")
                ))
            })
    }
}

impl fmt::Display for Metric {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// `--index` value: a single index or every index.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IndexSelector {
    One(Index),
    All,
}

impl IndexSelector {
    pub fn expand(self) -> Vec<Index> {
        match self {
            Self::One(index) => vec![index],
            Self::All => Index::ALL.to_vec(),
        }
    }
}

impl FromStr for IndexSelector {
    type Err = OpenDiggerError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s == "all" {
            Ok(Self::All)
        } else {
            s.parse().map(Self::One)
        }
    }
}

/// `--metric` value: a single metric or the composite set.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MetricSelector {
    One(Metric),
    All,
}

impl MetricSelector {
    pub fn expand(self) -> Vec<Metric> {
        match self {
            Self::One(metric) => vec![metric],
            Self::All => Metric::COMPOSITE.to_vec(),
        }
    }
}

impl FromStr for MetricSelector {
    type Err = OpenDiggerError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s == "all" {
            Ok(Self::All)
        } else {
            s.parse().map(Self::One)
        }
    }
}
