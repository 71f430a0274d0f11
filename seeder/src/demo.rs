//! Fixed demo content for a fresh hub.

pub struct DemoPost {
    pub post_type: &'static str,
    pub title: &'static str,
    pub content: &'static str,
    pub tags: &'static [&'static str],
    pub is_pinned: bool,
    pub external_link: Option<&'static str>,
}

pub struct DemoComment {
    pub content: &'static str,
    /// Index into [`POSTS`]
    pub post: usize,
}

pub struct DemoDocument {
    pub title: &'static str,
    pub category: &'static str,
    pub description: &'static str,
    pub file_url: &'static str,
    pub file_type: &'static str,
    pub tags: &'static [&'static str],
}

pub static POSTS: [DemoPost; 6] = [
    DemoPost {
        post_type: "news",
        title: "New EPA standards for heavy-duty diesel engines",
        content: "Tighter NOx and particulate limits take effect next model year, with longer \
                  useful-life requirements and real-world test procedures.\n\n\
                  Expect changes to SCR catalysts, DPF filters and DEF dosing. Reman test \
                  protocols will be updated to match.",
        tags: &["EPA", "Regulations", "Emissions"],
        is_pinned: true,
        external_link: Some("https://www.epa.gov/regulations-emissions-vehicles-and-engines"),
    },
    DemoPost {
        post_type: "bulletin",
        title: "Parts shipment arriving Friday",
        content: "Turbochargers, EGR coolers, injectors and high-pressure fuel pumps are on the \
                  truck. Unloading starts at 8 AM, so please clear warehouse space by Thursday.",
        tags: &["Inventory", "Shipment", "Warehouse"],
        is_pinned: false,
        external_link: None,
    },
    DemoPost {
        post_type: "diesel_tech",
        title: "Common rail injection pressure keeps climbing",
        content: "Rail pressures went from roughly 1,600 bar in the early 2000s to 2,500 bar and \
                  beyond today. Finer atomization means cleaner combustion, but also tighter \
                  tolerances and more sensitivity to fuel quality.\n\n\
                  Pay extra attention to wear patterns and calibration on reman injectors.",
        tags: &["Common Rail", "Fuel Systems"],
        is_pinned: false,
        external_link: None,
    },
    DemoPost {
        post_type: "announcement",
        title: "DEF quality alert",
        content: "Contaminated DEF is causing SCR failures: efficiency codes, crystallized dosing \
                  modules and clogged lines. Use ISO 22241 fluid, check concentration with a \
                  refractometer, and record the DEF brand when diagnosing.",
        tags: &["DEF", "SCR", "Diagnostics"],
        is_pinned: true,
        external_link: None,
    },
    DemoPost {
        post_type: "diesel_tech",
        title: "What fifty failed turbos taught us",
        content: "Oil contamination was the top failure mode, followed by compressor surge, \
                  exhaust restrictions and shaft imbalance. Most of these are preventable with \
                  clean oil, good air filtration, correct sizing and a healthy DPF.",
        tags: &["Turbochargers", "Failure Analysis"],
        is_pinned: false,
        external_link: None,
    },
    DemoPost {
        post_type: "bulletin",
        title: "100 days without a shop floor injury",
        content: "Thanks to everyone following protocols, wearing PPE and reporting hazards. \
                  Lunch is on us Friday.",
        tags: &["Safety", "Team"],
        is_pinned: false,
        external_link: None,
    },
];

pub static COMMENTS: [DemoComment; 5] = [
    DemoComment {
        content: "We have been seeing the same pressure issues on the bench.",
        post: 0,
    },
    DemoComment {
        content: "Thanks for the heads up on the shipment.",
        post: 1,
    },
    DemoComment {
        content: "Can we get specs on the new turbos?",
        post: 2,
    },
    DemoComment {
        content: "Exactly what I needed before the audit.",
        post: 0,
    },
    DemoComment {
        content: "Count me in for Friday.",
        post: 1,
    },
];

pub static DOCUMENTS: [DemoDocument; 3] = [
    DemoDocument {
        title: "Turbocharger rebuild procedure",
        category: "training_video",
        description: "Step-by-step rebuild of common turbocharger models",
        file_url: "/docs/turbo-rebuild-guide.pdf",
        file_type: "pdf",
        tags: &["Turbo", "Rebuild", "Procedure"],
    },
    DemoDocument {
        title: "DPF fault codes quick reference",
        category: "faq",
        description: "DPF-related fault codes and their usual fixes",
        file_url: "/docs/dpf-fault-codes.pdf",
        file_type: "pdf",
        tags: &["DPF", "Diagnostics", "Fault Codes"],
    },
    DemoDocument {
        title: "Diesel fuel handling safety data sheet",
        category: "safety_guideline",
        description: "Handling and emergency procedures for #2 diesel fuel",
        file_url: "/docs/diesel-fuel-sds.pdf",
        file_type: "pdf",
        tags: &["Safety", "SDS", "Diesel Fuel"],
    },
];
