//! Structural parsing of the parking site's HTML.
//!
//! The site is an external, uncontrolled page; these functions are the
//! only place coupled to its markup. Both take plain strings so they can
//! be exercised against fixture documents.

use std::collections::BTreeMap;

use scraper::{Html, Selector};
use url::Url;

use crate::error::LotError;
use crate::status::RawStatus;

/// Anchor class marking one lot in the directory listing.
const LOT_LINK_SELECTOR: &str = "a.ParkingLinkX";

/// Table cell holding the status image on a lot's detail page.
const STATUS_CELL_SELECTOR: &str = "td.ParkingDetailsTable";

/// Parse the directory page into a lot name -> detail URL map.
///
/// Relative hrefs are resolved against `base`. If the page lists a name
/// twice the last occurrence wins; anchors without an href are skipped.
pub fn parse_directory(html: &str, base: &Url) -> BTreeMap<String, String> {
    let document = Html::parse_document(html);
    let selector = Selector::parse(LOT_LINK_SELECTOR).unwrap();

    let mut lots = BTreeMap::new();
    for element in document.select(&selector) {
        let href = match element.value().attr("href") {
            Some(h) if !h.is_empty() => h,
            _ => continue,
        };
        let name = element.text().collect::<String>().trim().to_string();
        if name.is_empty() {
            continue;
        }
        let url = match base.join(href) {
            Ok(u) => u.to_string(),
            Err(_) => continue,
        };
        lots.insert(name, url);
    }
    lots
}

/// Parse a lot's detail page into its raw status.
///
/// Exactly one status cell with exactly one image is the expected shape;
/// the token is the filename stem of the image source. A missing cell or
/// image means the lot simply has no visible status (`Unknown`). More
/// than one of either is a schema violation and fails the lot.
pub fn parse_status(html: &str) -> Result<RawStatus, LotError> {
    let document = Html::parse_document(html);
    let cell_selector = Selector::parse(STATUS_CELL_SELECTOR).unwrap();
    let img_selector = Selector::parse("img").unwrap();

    let cells: Vec<_> = document.select(&cell_selector).collect();
    if cells.is_empty() {
        return Ok(RawStatus::Unknown);
    }
    if cells.len() > 1 {
        return Err(LotError::SchemaViolation {
            element: "status cell",
            count: cells.len(),
        });
    }

    let images: Vec<_> = cells[0].select(&img_selector).collect();
    if images.is_empty() {
        return Ok(RawStatus::Unknown);
    }
    if images.len() > 1 {
        return Err(LotError::SchemaViolation {
            element: "status image",
            count: images.len(),
        });
    }

    match images[0].value().attr("src") {
        Some(src) => Ok(RawStatus::from_image_src(src)),
        None => Ok(RawStatus::Unknown),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn base() -> Url {
        Url::parse("http://www.ahuzot.co.il/Parking/All/").unwrap()
    }

    #[test]
    fn directory_maps_names_to_resolved_urls() {
        let html = r#"
            <html><body>
              <a class="ParkingLinkX" href="/Parking/ParkingDetails/?ID=1">Basel</a>
              <a class="ParkingLinkX" href="http://www.ahuzot.co.il/Parking/ParkingDetails/?ID=2">Arlozorov</a>
              <a class="OtherLink" href="/Parking/ParkingDetails/?ID=3">Ignored</a>
            </body></html>
        "#;
        let lots = parse_directory(html, &base());
        assert_eq!(lots.len(), 2);
        assert_eq!(
            lots["Basel"],
            "http://www.ahuzot.co.il/Parking/ParkingDetails/?ID=1"
        );
        assert_eq!(
            lots["Arlozorov"],
            "http://www.ahuzot.co.il/Parking/ParkingDetails/?ID=2"
        );
    }

    #[test]
    fn directory_duplicate_name_last_occurrence_wins() {
        let html = r#"
            <a class="ParkingLinkX" href="/Parking/ParkingDetails/?ID=1">Basel</a>
            <a class="ParkingLinkX" href="/Parking/ParkingDetails/?ID=9">Basel</a>
        "#;
        let lots = parse_directory(html, &base());
        assert_eq!(lots.len(), 1);
        assert!(lots["Basel"].ends_with("ID=9"));
    }

    #[test]
    fn directory_skips_anchors_without_href_or_name() {
        let html = r#"
            <a class="ParkingLinkX">No href</a>
            <a class="ParkingLinkX" href="/Parking/ParkingDetails/?ID=4">  </a>
        "#;
        assert!(parse_directory(html, &base()).is_empty());
    }

    #[test]
    fn status_token_comes_from_image_filename_stem() {
        let html = r#"
            <table><tr>
              <td class="ParkingDetailsTable"><img src="/pics/ParkingIcons/meat.png"></td>
            </tr></table>
        "#;
        assert_eq!(
            parse_status(html).unwrap(),
            RawStatus::Token("meat".into())
        );
    }

    #[test]
    fn missing_cell_is_unknown_not_an_error() {
        let html = "<html><body><p>maintenance page</p></body></html>";
        assert_eq!(parse_status(html).unwrap(), RawStatus::Unknown);
    }

    #[test]
    fn cell_without_image_is_unknown() {
        let html = r#"<td class="ParkingDetailsTable">closed</td>"#;
        assert_eq!(parse_status(html).unwrap(), RawStatus::Unknown);
    }

    #[test]
    fn image_without_src_is_unknown() {
        let html = r#"<td class="ParkingDetailsTable"><img alt="status"></td>"#;
        assert_eq!(parse_status(html).unwrap(), RawStatus::Unknown);
    }

    #[test]
    fn multiple_status_cells_violate_the_schema() {
        let html = r#"
            <table><tr>
              <td class="ParkingDetailsTable"><img src="male.png"></td>
              <td class="ParkingDetailsTable"><img src="panui.png"></td>
            </tr></table>
        "#;
        match parse_status(html) {
            Err(LotError::SchemaViolation { element, count }) => {
                assert_eq!(element, "status cell");
                assert_eq!(count, 2);
            }
            other => panic!("expected schema violation, got {other:?}"),
        }
    }

    #[test]
    fn multiple_status_images_violate_the_schema() {
        let html = r#"
            <table><tr>
              <td class="ParkingDetailsTable">
                <img src="male.png"><img src="panui.png">
              </td>
            </tr></table>
        "#;
        match parse_status(html) {
            Err(LotError::SchemaViolation { element, count }) => {
                assert_eq!(element, "status image");
                assert_eq!(count, 2);
            }
            other => panic!("expected schema violation, got {other:?}"),
        }
    }
}
