//! EPSG code detection from coordinate reference system records.

use crate::cloud::CrsRecord;

pub const PROJECTION_USER_ID: &str = "LASF_Projection";
const GEO_KEY_DIRECTORY: u16 = 34735;
const OGC_WKT: u16 = 2112;

const PROJECTED_CS_TYPE_KEY: u16 = 3072;
const GEOGRAPHIC_TYPE_KEY: u16 = 2048;
const USER_DEFINED: u16 = 32767;

/// Checks whether a record holds coordinate reference system information.
pub fn is_crs_record(user_id: &str) -> bool {
    user_id == PROJECTION_USER_ID
}

/// Finds the horizontal EPSG code of a cloud.
///
/// WKT records take precedence over GeoTIFF keys, as in LAS 1.4 files the
/// WKT is authoritative.
pub fn epsg_from_crs(records: &[CrsRecord]) -> Option<u32> {
    let wkt = records
        .iter()
        .filter(|r| r.user_id == PROJECTION_USER_ID && r.record_id == OGC_WKT)
        .find_map(|r| epsg_from_wkt(&String::from_utf8_lossy(&r.data)));
    if wkt.is_some() {
        return wkt;
    }

    records
        .iter()
        .filter(|r| r.user_id == PROJECTION_USER_ID && r.record_id == GEO_KEY_DIRECTORY)
        .find_map(|r| epsg_from_geo_keys(&r.data))
}

/// Reads the projected (or geographic) CRS key of a GeoKeyDirectory.
fn epsg_from_geo_keys(data: &[u8]) -> Option<u32> {
    let words: Vec<u16> = data
        .chunks_exact(2)
        .map(|c| u16::from_le_bytes([c[0], c[1]]))
        .collect();
    let key_count = *words.get(3)? as usize;

    let mut geographic = None;
    for key in words.get(4..)?.chunks_exact(4).take(key_count) {
        let (id, location, value) = (key[0], key[1], key[3]);
        if location != 0 || value == 0 || value == USER_DEFINED {
            continue;
        }
        match id {
            PROJECTED_CS_TYPE_KEY => return Some(value as u32),
            GEOGRAPHIC_TYPE_KEY => geographic = Some(value as u32),
            _ => {}
        }
    }
    geographic
}

/// Extracts the EPSG authority of the projected CRS of a WKT string.
///
/// Handles WKT1 (`PROJCS[... AUTHORITY["EPSG","2154"]]`) and WKT2
/// (`PROJCRS[... ID["EPSG",2154]]`). For compound definitions the projected
/// component is used.
pub fn epsg_from_wkt(wkt: &str) -> Option<u32> {
    for (keyword, authority) in [("PROJCS[", "AUTHORITY["), ("PROJCRS[", "ID[")] {
        if let Some(start) = wkt.find(keyword) {
            let body = element_body(&wkt[start..]);
            if let Some(code) = last_epsg(body, authority) {
                return Some(code);
            }
        }
    }
    last_epsg(wkt, "AUTHORITY[").or_else(|| last_epsg(wkt, "ID["))
}

/// Slice of `text` up to the bracket closing its first opening bracket.
fn element_body(text: &str) -> &str {
    let mut depth = 0usize;
    for (i, c) in text.char_indices() {
        match c {
            '[' => depth += 1,
            ']' => {
                depth = depth.saturating_sub(1);
                if depth == 0 {
                    return &text[..=i];
                }
            }
            _ => {}
        }
    }
    text
}

fn last_epsg(text: &str, authority: &str) -> Option<u32> {
    text.match_indices(authority)
        .filter_map(|(i, _)| {
            let rest = &text[i + authority.len()..];
            let rest = rest.trim_start().strip_prefix("\"EPSG\"")?;
            let rest = rest.trim_start().strip_prefix(',')?;
            let digits: String = rest
                .trim_start()
                .trim_start_matches('"')
                .chars()
                .take_while(|c| c.is_ascii_digit())
                .collect();
            digits.parse().ok()
        })
        .last()
}

#[cfg(test)]
mod tests {
    use super::*;

    const LAMBERT_93: &str = r#"COMPD_CS["RGF93 v1 / Lambert-93 + NGF-IGN69 height",PROJCS["RGF93 v1 / Lambert-93",GEOGCS["RGF93 v1",DATUM["Reseau_Geodesique_Francais_1993_v1",SPHEROID["GRS 1980",6378137,298.257222101],AUTHORITY["EPSG","6171"]],AUTHORITY["EPSG","4171"]],PROJECTION["Lambert_Conformal_Conic_2SP"],UNIT["metre",1],AUTHORITY["EPSG","2154"]],VERT_CS["NGF-IGN69 height",VERT_DATUM["Nivellement General de la France - IGN69",2005,AUTHORITY["EPSG","5119"]],AUTHORITY["EPSG","5720"]],AUTHORITY["EPSG","9001"]]"#;

    fn record(record_id: u16, data: Vec<u8>) -> CrsRecord {
        CrsRecord {
            user_id: PROJECTION_USER_ID.to_string(),
            record_id,
            description: String::new(),
            data,
        }
    }

    #[test]
    fn test_compound_wkt_uses_projected_component() {
        assert_eq!(epsg_from_wkt(LAMBERT_93), Some(2154));
    }

    #[test]
    fn test_wkt2_id() {
        let wkt = r#"PROJCRS["WGS 84 / UTM zone 31N",BASEGEOGCRS["WGS 84",ID["EPSG",4326]],ID["EPSG",32631]]"#;
        assert_eq!(epsg_from_wkt(wkt), Some(32631));
    }

    #[test]
    fn test_geographic_wkt_falls_back_to_last_authority() {
        let wkt = r#"GEOGCS["WGS 84",DATUM["WGS_1984",AUTHORITY["EPSG","6326"]],AUTHORITY["EPSG","4326"]]"#;
        assert_eq!(epsg_from_wkt(wkt), Some(4326));
    }

    #[test]
    fn test_geo_key_directory() {
        let words: [u16; 12] = [1, 1, 0, 2, 1024, 0, 1, 1, 3072, 0, 1, 2154];
        let data: Vec<u8> = words.iter().flat_map(|w| w.to_le_bytes()).collect();
        assert_eq!(epsg_from_crs(&[record(GEO_KEY_DIRECTORY, data)]), Some(2154));
    }

    #[test]
    fn test_wkt_record_wins_over_geo_keys() {
        let words: [u16; 8] = [1, 1, 0, 1, 3072, 0, 1, 32631];
        let keys: Vec<u8> = words.iter().flat_map(|w| w.to_le_bytes()).collect();
        let records = vec![
            record(GEO_KEY_DIRECTORY, keys),
            record(OGC_WKT, LAMBERT_93.as_bytes().to_vec()),
        ];
        assert_eq!(epsg_from_crs(&records), Some(2154));
    }

    #[test]
    fn test_no_records() {
        assert_eq!(epsg_from_crs(&[]), None);
    }
}
