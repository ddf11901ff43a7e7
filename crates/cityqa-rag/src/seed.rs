//! The fixed seed knowledge base ingested at bootstrap.
//!
//! Six topic documents covering the city basics. They go through the same
//! content-addressed `add` path as everything else, so re-seeding against a
//! persistent store is a no-op.

use cityqa_core::types::Metadata;
use serde_json::Value;

pub struct SeedDocument {
    pub content: &'static str,
    pub source: &'static str,
    pub category: &'static str,
    pub date: &'static str,
}

impl SeedDocument {
    pub fn metadata(&self) -> Metadata {
        let mut metadata = Metadata::new();
        metadata.insert("source".to_string(), Value::from(self.source));
        metadata.insert("category".to_string(), Value::from(self.category));
        metadata.insert("date".to_string(), Value::from(self.date));
        metadata
    }
}

pub const SEED_DOCUMENTS: [SeedDocument; 6] = [
    SeedDocument {
        content: "Revere is a city in Suffolk County, Massachusetts, United States, \
            located approximately 5 miles from downtown Boston. Known for Revere Beach, \
            America's first public beach, established in 1896. The city has a population \
            of approximately 62,186 as of the 2020 census.",
        source: "city_overview",
        category: "general",
        date: "2024",
    },
    SeedDocument {
        content: "Revere Beach is a public beach in Revere, Massachusetts, located \
            about 5 miles north of downtown Boston. Founded in 1896, it is America's \
            first public beach. The beach is over 3 miles long and is easily accessible \
            by the MBTA Blue Line.",
        source: "attractions",
        category: "tourism",
        date: "2024",
    },
    SeedDocument {
        content: "The MBTA Blue Line serves Revere with stations at Wonderland, Revere \
            Beach, Beachmont, and Suffolk Downs. The Blue Line provides direct service \
            to downtown Boston, with connections to other subway lines at Government \
            Center and State Street.",
        source: "transportation",
        category: "transit",
        date: "2024",
    },
    SeedDocument {
        content: "Revere City Hall is located at 281 Broadway, Revere, MA 02151. \
            Phone: (781) 286-8100. Office hours are Monday-Friday, 8:00 AM - 4:30 PM. \
            The city provides various services including permits, licenses, tax \
            payments, and public records.",
        source: "city_services",
        category: "government",
        date: "2024",
    },
    SeedDocument {
        content: "Revere Public Schools serves approximately 7,800 students across 11 \
            schools. The district includes Revere High School, three middle schools, \
            and seven elementary schools. The school system is known for its diversity \
            and multilingual programs.",
        source: "education",
        category: "schools",
        date: "2024",
    },
    SeedDocument {
        content: "Major development projects in Revere include the redevelopment of \
            Suffolk Downs, which will create a new mixed-use neighborhood with housing, \
            retail, and office space. The Wonderland redevelopment is another \
            significant project aimed at revitalizing the area around the transit \
            station.",
        source: "development",
        category: "planning",
        date: "2024",
    },
];
