use serde::{Deserialize, Serialize};

/// Faceted query parameters a Shopify collection URL can carry.
///
/// Variants are declared in evaluation order; explanations list active
/// parameters in this order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FacetParam {
    Filter,
    Sort,
    Page,
}

impl FacetParam {
    pub const ALL: [FacetParam; 3] = [FacetParam::Filter, FacetParam::Sort, FacetParam::Page];

    /// Storefront-facing label used in explanations.
    pub fn label(self) -> &'static str {
        match self {
            FacetParam::Filter => "filter.v.*",
            FacetParam::Sort => "sort_by",
            FacetParam::Page => "page",
        }
    }

    /// Map a raw query key to the facet it represents.
    ///
    /// Filter keys are namespaced (`filter.v.price.gte`, `filter.v.option.size`),
    /// so only the prefix is matched. Sort and page keys must match exactly.
    pub fn from_query_key(key: &str) -> Option<Self> {
        if key.starts_with("filter.v.") {
            Some(FacetParam::Filter)
        } else if key == "sort_by" {
            Some(FacetParam::Sort)
        } else if key == "page" {
            Some(FacetParam::Page)
        } else {
            None
        }
    }
}

/// Presence flags for the three faceted parameters of one URL.
///
/// Absent fields deserialize as `false`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(default)]
pub struct ParameterFlags {
    pub has_filter_param: bool,
    pub has_sort_param: bool,
    pub has_page_param: bool,
}

impl ParameterFlags {
    pub fn new(has_filter_param: bool, has_sort_param: bool, has_page_param: bool) -> Self {
        Self {
            has_filter_param,
            has_sort_param,
            has_page_param,
        }
    }

    /// Build flags from decoded query pairs; values are ignored.
    pub fn from_query_pairs<I, K, V>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
    {
        let mut flags = Self::default();
        for (key, _) in pairs {
            if let Some(param) = FacetParam::from_query_key(key.as_ref()) {
                flags.set(param);
            }
        }
        flags
    }

    pub fn is_set(&self, param: FacetParam) -> bool {
        match param {
            FacetParam::Filter => self.has_filter_param,
            FacetParam::Sort => self.has_sort_param,
            FacetParam::Page => self.has_page_param,
        }
    }

    pub fn set(&mut self, param: FacetParam) {
        match param {
            FacetParam::Filter => self.has_filter_param = true,
            FacetParam::Sort => self.has_sort_param = true,
            FacetParam::Page => self.has_page_param = true,
        }
    }

    /// Active parameters in evaluation order.
    pub fn active(&self) -> Vec<FacetParam> {
        FacetParam::ALL
            .into_iter()
            .filter(|param| self.is_set(*param))
            .collect()
    }

    pub fn is_clean(&self) -> bool {
        !(self.has_filter_param || self.has_sort_param || self.has_page_param)
    }

    /// Every flag combination, for exhaustive checks and lookup tables.
    pub fn all_combinations() -> impl Iterator<Item = ParameterFlags> {
        (0u8..8).map(|bits| {
            ParameterFlags::new(bits & 0b100 != 0, bits & 0b010 != 0, bits & 0b001 != 0)
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn query_keys_map_to_facets() {
        assert_eq!(
            FacetParam::from_query_key("filter.v.price.gte"),
            Some(FacetParam::Filter)
        );
        assert_eq!(
            FacetParam::from_query_key("filter.v.option.color"),
            Some(FacetParam::Filter)
        );
        assert_eq!(FacetParam::from_query_key("sort_by"), Some(FacetParam::Sort));
        assert_eq!(FacetParam::from_query_key("page"), Some(FacetParam::Page));
    }

    #[test]
    fn lookalike_keys_are_ignored() {
        for key in [
            "filter",
            "filter.p.tag",
            "sort",
            "SORT_BY",
            "pages",
            "Page",
            "utm_source",
            "",
        ] {
            assert_eq!(FacetParam::from_query_key(key), None, "key {key:?}");
        }
    }

    #[test]
    fn query_pairs_set_matching_flags() {
        let flags = ParameterFlags::from_query_pairs([
            ("filter.v.availability", "1"),
            ("utm_campaign", "spring"),
            ("page", "3"),
        ]);
        assert_eq!(flags, ParameterFlags::new(true, false, true));
        assert_eq!(flags.active(), vec![FacetParam::Filter, FacetParam::Page]);
    }

    #[test]
    fn missing_json_fields_default_to_false() {
        let flags: ParameterFlags = serde_json::from_str(r#"{"has_sort_param":true}"#).unwrap();
        assert_eq!(flags, ParameterFlags::new(false, true, false));

        let empty: ParameterFlags = serde_json::from_str("{}").unwrap();
        assert!(empty.is_clean());
    }

    #[test]
    fn all_combinations_are_distinct() {
        let combos: std::collections::HashSet<_> = ParameterFlags::all_combinations().collect();
        assert_eq!(combos.len(), 8);
    }
}
