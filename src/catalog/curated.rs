//! Curated destination images

use crate::place::normalize_place_name;

/// Destination name → image URL, in lookup order.
///
/// Substring matches return the first entry that hits, so more specific
/// names sharing a word with a shorter one may come first.
pub const CURATED_IMAGES: &[(&str, &str)] = &[
    // Bali & Nusa Tenggara
    ("Sacred Monkey Forest Ubud", "https://commons.wikimedia.org/wiki/Special:FilePath/Ubud_Monkey_Forest_temple.jpg"),
    ("Ubud", "https://commons.wikimedia.org/wiki/Special:FilePath/Tegallalang_rice_terraces_Ubud.jpg"),
    ("Tanah Lot", "https://commons.wikimedia.org/wiki/Special:FilePath/Tanah_Lot_Bali.jpg"),
    ("Uluwatu", "https://commons.wikimedia.org/wiki/Special:FilePath/Pura_Luhur_Uluwatu.jpg"),
    ("Nusa Penida", "https://commons.wikimedia.org/wiki/Special:FilePath/Kelingking_Beach_Nusa_Penida.jpg"),
    ("Gili Trawangan", "https://commons.wikimedia.org/wiki/Special:FilePath/Gili_Trawangan_beach.jpg"),
    ("Labuan Bajo", "https://commons.wikimedia.org/wiki/Special:FilePath/Labuan_Bajo_harbour.jpg"),
    ("Pulau Komodo", "https://commons.wikimedia.org/wiki/Special:FilePath/Komodo_Island_view.jpg"),
    ("Danau Kelimutu", "https://commons.wikimedia.org/wiki/Special:FilePath/Kelimutu_crater_lakes.jpg"),
    // Java
    ("Borobudur", "https://commons.wikimedia.org/wiki/Special:FilePath/Borobudur-Nothwest-view.jpg"),
    ("Prambanan", "https://commons.wikimedia.org/wiki/Special:FilePath/Prambanan_Temple_Yogyakarta.jpg"),
    ("Gunung Bromo", "https://commons.wikimedia.org/wiki/Special:FilePath/Mount_Bromo_at_sunrise.jpg"),
    ("Kawah Ijen", "https://commons.wikimedia.org/wiki/Special:FilePath/Kawah_Ijen_crater_lake.jpg"),
    ("Malioboro", "https://commons.wikimedia.org/wiki/Special:FilePath/Jalan_Malioboro_Yogyakarta.jpg"),
    ("Kota Tua Jakarta", "https://commons.wikimedia.org/wiki/Special:FilePath/Fatahillah_Square_Kota_Tua.jpg"),
    ("Kawah Putih", "https://commons.wikimedia.org/wiki/Special:FilePath/Kawah_Putih_Ciwidey.jpg"),
    // Sumatra
    ("Danau Toba", "https://commons.wikimedia.org/wiki/Special:FilePath/Lake_Toba_Samosir.jpg"),
    ("Bukittinggi", "https://commons.wikimedia.org/wiki/Special:FilePath/Jam_Gadang_Bukittinggi.jpg"),
    ("Belitung", "https://commons.wikimedia.org/wiki/Special:FilePath/Tanjung_Tinggi_Beach_Belitung.jpg"),
    // Sulawesi, Maluku & Papua
    ("Tana Toraja", "https://commons.wikimedia.org/wiki/Special:FilePath/Tongkonan_Tana_Toraja.jpg"),
    ("Bunaken", "https://commons.wikimedia.org/wiki/Special:FilePath/Bunaken_reef.jpg"),
    ("Wakatobi", "https://commons.wikimedia.org/wiki/Special:FilePath/Wakatobi_coast.jpg"),
    ("Raja Ampat", "https://commons.wikimedia.org/wiki/Special:FilePath/Raja_Ampat_Wayag_islands.jpg"),
    ("Lembah Baliem", "https://commons.wikimedia.org/wiki/Special:FilePath/Baliem_Valley_Papua.jpg"),
];

/// Look up a curated image.
///
/// Exact match on the normalized name first, then a case-insensitive
/// substring match in either direction. First hit in table order wins.
pub fn curated_match(place_name: &str) -> Option<&'static str> {
    let name = normalize_place_name(place_name);
    if name.is_empty() {
        return None;
    }

    if let Some((_, url)) = CURATED_IMAGES.iter().find(|(key, _)| *key == name) {
        return Some(url);
    }

    let query = name.to_lowercase();
    CURATED_IMAGES
        .iter()
        .find(|(key, _)| {
            let key = key.to_lowercase();
            key.contains(&query) || query.contains(&key)
        })
        .map(|(_, url)| *url)
}
