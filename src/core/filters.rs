use crate::models::StoredProfile;

/// Candidate pool constraints applied by the caller before ranking
///
/// The ranker scores whatever it is given; eligibility lives here.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CandidateFilter {
    /// Profile name to leave out, usually the requesting user
    pub exclude_name: Option<String>,
    /// Required sex, compared case-insensitively
    pub sex: Option<String>,
}

impl CandidateFilter {
    /// Candidates of the opposite sex, excluding the profile itself
    pub fn reciprocal_for(profile: &StoredProfile) -> Self {
        Self {
            exclude_name: Some(profile.name.clone()),
            sex: Some(opposite_sex(&profile.sex).to_string()),
        }
    }

    /// Check if a stored profile passes the filter
    #[inline]
    pub fn matches(&self, candidate: &StoredProfile) -> bool {
        if self
            .exclude_name
            .as_ref()
            .is_some_and(|name| *name == candidate.name)
        {
            return false;
        }

        if let Some(sex) = &self.sex {
            if !sex.eq_ignore_ascii_case(candidate.sex.trim()) {
                return false;
            }
        }

        true
    }
}

/// "Female" for a male profile, "Male" for anything else
#[inline]
pub fn opposite_sex(sex: &str) -> &'static str {
    if sex.trim().eq_ignore_ascii_case("male") {
        "Female"
    } else {
        "Male"
    }
}
