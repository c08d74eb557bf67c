//! The featured-listing cap.
//!
//! The pure check here serves the admin table; the write itself goes through
//! the guarded update in `ListingRepository`.

use realty_database::Listing;

use crate::CatalogError;

pub const MAX_FEATURED: usize = 5;

pub fn featured_count(listings: &[Listing]) -> usize {
    listings.iter().filter(|listing| listing.featured).count()
}

/// Decide the featured flag after toggling listing `id`.
///
/// Turning a listing off always succeeds. Turning one on fails with
/// [`CatalogError::FeaturedLimitReached`] once `limit` listings are featured.
pub fn check_toggle(listings: &[Listing], id: &str, limit: usize) -> Result<bool, CatalogError> {
    let listing = listings
        .iter()
        .find(|listing| listing.id == id)
        .ok_or_else(|| CatalogError::NotFound(id.to_string()))?;

    if listing.featured {
        return Ok(false);
    }

    if featured_count(listings) >= limit {
        return Err(CatalogError::FeaturedLimitReached { limit });
    }

    Ok(true)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_fixtures::listing;

    fn collection(featured: usize, plain: usize) -> Vec<Listing> {
        let mut items = Vec::new();
        for index in 0..featured {
            let mut item = listing(&format!("f{index}"), "Casa", "Centro", "Teresina", None);
            item.featured = true;
            items.push(item);
        }
        for index in 0..plain {
            items.push(listing(&format!("p{index}"), "Casa", "Centro", "Teresina", None));
        }
        items
    }

    #[test]
    fn toggling_on_below_limit_is_allowed() {
        let items = collection(4, 1);
        assert!(check_toggle(&items, "p0", MAX_FEATURED).unwrap());
    }

    #[test]
    fn toggling_on_at_limit_is_rejected() {
        let items = collection(5, 1);
        let before = items.clone();

        let result = check_toggle(&items, "p0", MAX_FEATURED);
        assert!(matches!(result, Err(CatalogError::FeaturedLimitReached { limit: 5 })));
        assert_eq!(items, before);
        assert_eq!(featured_count(&items), 5);
    }

    #[test]
    fn toggling_off_is_always_allowed() {
        let items = collection(5, 0);
        assert!(!check_toggle(&items, "f3", MAX_FEATURED).unwrap());
    }

    #[test]
    fn unknown_id_is_not_found() {
        let items = collection(1, 1);
        assert!(matches!(
            check_toggle(&items, "missing", MAX_FEATURED),
            Err(CatalogError::NotFound(_))
        ));
    }
}
