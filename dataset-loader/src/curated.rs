//! Built-in home-care notes appended to every ingestion run.

use std::collections::BTreeMap;

use crate::documents::Document;

struct CuratedEntry {
    slug: &'static str,
    title: &'static str,
    body: &'static str,
}

const CURATED: [CuratedEntry; 20] = [
    CuratedEntry {
        slug: "flu_symptoms",
        title: "Flu symptoms overview",
        body: "Common flu symptoms include fever or chills, cough, sore throat, \
               runny or stuffy nose, muscle or body aches, headaches, fatigue, \
               and sometimes vomiting or diarrhea (more common in children).",
    },
    CuratedEntry {
        slug: "flu_when_seek_help",
        title: "Flu when to seek care",
        body: "Seek medical care for flu if you have trouble breathing, chest \
               pain, persistent dizziness, confusion, severe weakness, or if \
               symptoms improve then return with fever and worse cough.",
    },
    CuratedEntry {
        slug: "cold_vs_flu",
        title: "Cold vs flu basics",
        body: "Colds usually start gradually with milder symptoms like sneezing \
               and runny nose, while flu often starts suddenly with fever, \
               body aches, and marked fatigue.",
    },
    CuratedEntry {
        slug: "fever_overview",
        title: "Fever basics",
        body: "Fever is a body temperature higher than normal, commonly above \
               100.4 F (38 C). It can occur with infections and usually improves \
               with rest, fluids, and fever-reducing medicines.",
    },
    CuratedEntry {
        slug: "hydration_tips",
        title: "Hydration tips",
        body: "For viral illnesses, rest and hydration can help recovery. \
               Drink water or oral rehydration fluids, and monitor for signs \
               of dehydration such as dark urine or dizziness.",
    },
    CuratedEntry {
        slug: "sore_throat_home_care",
        title: "Sore throat home care",
        body: "Home care for a mild sore throat: warm fluids, honey in tea \
               (avoid in children under 1 year), saltwater gargles, throat \
               lozenges, and rest. Seek care if severe pain, trouble breathing \
               or swallowing, high fever, or symptoms last longer than a week.",
    },
    CuratedEntry {
        slug: "cough_home_care",
        title: "Cough home care",
        body: "For a mild cough: stay hydrated, use warm drinks, honey for adults \
               and children over 1 year, and consider humidified air. Seek care \
               if cough lasts more than 2-3 weeks, blood in mucus, chest pain, \
               or shortness of breath.",
    },
    CuratedEntry {
        slug: "runny_nose_home_care",
        title: "Runny nose home care",
        body: "For runny or stuffy nose: saline nasal spray or rinse, steam \
               inhalation, fluids, and rest. Seek care if severe sinus pain, \
               high fever, or symptoms last more than 10 days.",
    },
    CuratedEntry {
        slug: "headache_home_care",
        title: "Headache home care",
        body: "For mild headaches: rest in a quiet room, hydrate, apply a cool \
               or warm compress, and avoid triggers. Seek care for sudden severe \
               headache, weakness, confusion, or after head injury.",
    },
    CuratedEntry {
        slug: "indigestion_home_care",
        title: "Indigestion home care",
        body: "For indigestion: eat smaller meals, avoid lying down after eating, \
               limit spicy or fatty foods, and sip water. Seek care if severe \
               abdominal pain, vomiting blood, or black stools.",
    },
    CuratedEntry {
        slug: "constipation_home_care",
        title: "Constipation home care",
        body: "For constipation: drink water, increase fiber (fruits, vegetables, \
               whole grains), and stay active. Seek care if severe pain, blood \
               in stool, or constipation lasts more than 2 weeks.",
    },
    CuratedEntry {
        slug: "nausea_home_care",
        title: "Mild nausea home care",
        body: "For mild nausea: small sips of water, bland foods like crackers, \
               ginger tea, and rest. Seek care if persistent vomiting, signs of \
               dehydration, or severe abdominal pain.",
    },
    CuratedEntry {
        slug: "diarrhea_home_care",
        title: "Mild diarrhea home care",
        body: "For mild diarrhea: oral rehydration fluids, bland foods, and rest. \
               Avoid dairy and fatty foods for a day or two. Seek care for blood \
               in stool, high fever, or dehydration.",
    },
    CuratedEntry {
        slug: "muscle_strain_home_care",
        title: "Muscle strain home care",
        body: "For a mild muscle strain: rest the area, apply ice for 10-20 minutes \
               several times daily for the first 48 hours, then heat as needed. \
               Seek care if severe pain, swelling, or inability to use the limb.",
    },
    CuratedEntry {
        slug: "minor_burns_home_care",
        title: "Minor burn home care",
        body: "For minor burns: cool the area under running water for several minutes, \
               cover with a clean non-stick dressing, and avoid breaking blisters. \
               Seek care for large burns, face or hand burns, or signs of infection.",
    },
    CuratedEntry {
        slug: "insect_bite_home_care",
        title: "Insect bite home care",
        body: "For insect bites: wash with soap and water, apply a cold compress, \
               and avoid scratching. Seek care for spreading redness, fever, or \
               signs of allergic reaction (trouble breathing, facial swelling).",
    },
    CuratedEntry {
        slug: "seasonal_allergies_home_care",
        title: "Seasonal allergies home care",
        body: "For seasonal allergies: rinse nasal passages with saline, keep windows \
               closed during high pollen, and shower after being outside. Seek care \
               if symptoms are severe or causing breathing problems.",
    },
    CuratedEntry {
        slug: "mild_rash_home_care",
        title: "Mild rash home care",
        body: "For a mild rash: keep skin clean and dry, avoid new products, and use \
               cool compresses. Seek care if rash spreads rapidly, is painful, \
               or you have fever.",
    },
    CuratedEntry {
        slug: "oral_cold_sore_home_care",
        title: "Cold sore home care",
        body: "For cold sores: keep the area clean, avoid picking, and use cold \
               compresses for discomfort. Seek care if sores are severe, frequent, \
               or accompanied by high fever.",
    },
    CuratedEntry {
        slug: "earache_home_care",
        title: "Mild earache home care",
        body: "For mild ear discomfort: warm compresses and rest may help. Seek care \
               if severe pain, fever, drainage from the ear, or symptoms in young \
               children.",
    },
];

/// Returns the curated documents in a fixed order.
///
/// `text = "{title}\n\n{body}"`, `source = "curated"`, `doc_id = "curated_{slug}"`,
/// `topic = title`.
pub fn curated_documents() -> Vec<Document> {
    CURATED
        .iter()
        .map(|e| {
            let mut metadata = BTreeMap::new();
            metadata.insert("source".to_string(), "curated".to_string());
            metadata.insert("doc_id".to_string(), format!("curated_{}", e.slug));
            metadata.insert("topic".to_string(), e.title.to_string());
            Document {
                text: format!("{}\n\n{}", e.title, e.body),
                metadata,
            }
        })
        .collect()
}
