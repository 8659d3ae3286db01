//! Region and district tables for the delivery flow.
//!
//! Region names double as callback payloads, so the exact strings here
//! (including the U+2018 apostrophes) must stay stable.

/// Regions currently serviced by delivery. Everything else gets the
/// service-unavailable message and the user stays on the region menu.
pub const SERVICED_REGIONS: &[&str] = &["Farg‘ona"];

/// All regions with their districts, in menu order.
pub const REGIONS: &[(&str, &[&str])] = &[
    (
        "Toshkent",
        &[
            "Uchtepa", "Yashnobod", "Mirzo Ulug‘bek", "Chilonzor", "Yakkasaroy", "Mirobod",
            "Shayxontohur", "Yunusobod", "Olmaliq",
        ],
    ),
    (
        "Andijon",
        &[
            "Andijon", "Asaka", "Baliqchi", "Buloqbosh", "Izboskan", "Jalolobod", "Qo‘rg‘ontepa",
            "Marhamat", "Oltinko‘l", "Xo‘jaobod",
        ],
    ),
    (
        "Buxoro",
        &[
            "Buxoro", "G‘ijduvon", "Kogon", "Qorako‘l", "Romitan", "Shofirkon", "Vobkent",
            "Galaosiyo", "Peshku",
        ],
    ),
    (
        "Farg‘ona",
        &[
            "Farg‘ona", "Qo‘qon", "Marg‘ilon", "Buvayda", "Chimyon", "Dang‘ara", "Furqat",
            "Qoshtegirmon", "Yozyovon", "Uchko‘prik",
        ],
    ),
    (
        "Jizzax",
        &[
            "Jizzax", "Arnasoy", "Do‘stlik", "G‘allaorol", "Sharof Rashidov", "Zafarobod",
            "Zarbdor", "Mirzachul", "Paxtakor", "Yangiobod",
        ],
    ),
    (
        "Namangan",
        &[
            "Namangan", "Chortoq", "Pop", "Uychi", "Chartak", "Chust", "Kosonsoy",
            "To‘raqo‘rg‘on", "Yangiqo‘rg‘on", "Mingbuloq",
        ],
    ),
    (
        "Navoiy",
        &[
            "Navoiy", "Qiziltepa", "Navbahor", "Karmana", "Tomdi", "Uchquduq", "Beshrabot",
            "Nurota", "Xatirchi", "Konimex",
        ],
    ),
    (
        "Qashqadaryo",
        &[
            "Qarshi", "Shahrisabz", "Koson", "Chiroqchi", "Dehqonobod", "G‘uzor", "Qamashi",
            "Muborak", "Kitob", "Mirishkor",
        ],
    ),
    (
        "Samarqand",
        &[
            "Samarqand", "Ishtixon", "Paxtachi", "Bulung‘ur", "Jomboy", "Kattakurgan", "Narpay",
            "Nurobod", "Oqdaryo", "Payariq",
        ],
    ),
    (
        "Sirdaryo",
        &[
            "Guliston", "Sirdaryo", "Mirzaobod", "Sardoba", "Boyovut", "Oqoltin", "Sayxunobod",
            "Yangiyer", "Shirin", "Hovos",
        ],
    ),
    (
        "Surxondaryo",
        &[
            "Termiz", "Sho‘rtan", "Uzun", "Angor", "Bandixon", "Boysun", "Qiziriq", "Denov",
            "Jarqo‘rg‘on", "Sho‘rchi",
        ],
    ),
    (
        "Toshkent viloyati",
        &[
            "Nurafshon", "Zangiota", "O‘rtachirchiq", "Yangiyo‘l", "Bekobod", "Qibray", "Piskent",
            "Oqqo‘rg‘on", "Chirchiq",
        ],
    ),
    (
        "Xorazm",
        &[
            "Urganch", "Xonqa", "Yangiariq", "Bog‘ot", "Gurlan", "Hazorasp", "Xiva",
            "Qo‘shko‘pir", "Shovot", "Tuproqqal’a",
        ],
    ),
    (
        "Qoraqalpog‘iston Respublikasi",
        &[
            "Nukus", "Qungrad", "Mo‘ynoq", "Amudaryo", "Beruniy", "Chimboy", "Ellikqala",
            "Kegeyli", "Moynaq",
        ],
    ),
];

/// Whether delivery currently services this region.
pub fn is_serviced(region: &str) -> bool {
    SERVICED_REGIONS.contains(&region)
}

/// Districts of a region, or `None` for an unknown region name.
pub fn districts_of(region: &str) -> Option<&'static [&'static str]> {
    REGIONS
        .iter()
        .find(|(name, _)| *name == region)
        .map(|(_, districts)| *districts)
}

/// All region names in menu order.
pub fn region_names() -> impl Iterator<Item = &'static str> {
    REGIONS.iter().map(|(name, _)| *name)
}
