//! Default categories and the demonstration directory used by `init-db --sample`.

use chrono::{DateTime, Utc};

use crate::coordination::domain::{
    Category, CategoryId, Resource, ResourceId, ResourceStatus, Volunteer, VolunteerId,
    VolunteerStatus,
};
use crate::coordination::repository::{DirectoryStore, StoreError};

struct CategorySeed {
    name: &'static str,
    description: &'static str,
    icon: &'static str,
    color: &'static str,
}

const CATEGORIES: &[CategorySeed] = &[
    CategorySeed {
        name: "Healthcare",
        description: "Hospitals, clinics, and medical services",
        icon: "🏥",
        color: "#e74c3c",
    },
    CategorySeed {
        name: "Shelter",
        description: "Emergency shelters and housing assistance",
        icon: "🏠",
        color: "#3498db",
    },
    CategorySeed {
        name: "Food Distribution",
        description: "Food banks, meal programs, and nutrition services",
        icon: "🍽️",
        color: "#27ae60",
    },
    CategorySeed {
        name: "Emergency Services",
        description: "Fire, police, and emergency response",
        icon: "🚨",
        color: "#f39c12",
    },
    CategorySeed {
        name: "Mental Health",
        description: "Counseling and psychological support services",
        icon: "🧠",
        color: "#9b59b6",
    },
    CategorySeed {
        name: "Transportation",
        description: "Public transport and emergency transportation",
        icon: "🚗",
        color: "#34495e",
    },
];

struct ResourceSeed {
    name: &'static str,
    description: &'static str,
    category: &'static str,
    address: &'static str,
    coordinates: (f64, f64),
    phone: &'static str,
    email: Option<&'static str>,
    website: Option<&'static str>,
    operating_hours: &'static str,
    capacity: i64,
    current_availability: i64,
}

const RESOURCES: &[ResourceSeed] = &[
    ResourceSeed {
        name: "AIIMS Delhi",
        description: "24/7 emergency services and specialized healthcare",
        category: "Healthcare",
        address: "Ansari Nagar, New Delhi, Delhi 110029",
        coordinates: (28.5672, 77.2100),
        phone: "+91-11-2659-8955",
        email: Some("info@aiims.edu"),
        website: Some("https://www.aiims.edu"),
        operating_hours: "24/7",
        capacity: 2500,
        current_availability: 450,
    },
    ResourceSeed {
        name: "Sahaara Shelter Home",
        description: "Emergency shelter for families and individuals",
        category: "Shelter",
        address: "Sector 15, Gurgaon, Haryana 122001",
        coordinates: (28.4595, 77.0266),
        phone: "+91-124-427-8900",
        email: Some("contact@sahaarashelter.org"),
        website: None,
        operating_hours: "24/7",
        capacity: 200,
        current_availability: 45,
    },
    ResourceSeed {
        name: "Annapurna Food Bank",
        description: "Free food distribution and community kitchen",
        category: "Food Distribution",
        address: "Karol Bagh, New Delhi, Delhi 110005",
        coordinates: (28.6519, 77.1909),
        phone: "+91-11-2575-3421",
        email: Some("help@annapurnafoodbank.org"),
        website: Some("https://annapurnafoodbank.org"),
        operating_hours: "Daily 7AM-9PM",
        capacity: 500,
        current_availability: 275,
    },
    ResourceSeed {
        name: "Delhi Fire Station - Connaught Place",
        description: "Emergency response and fire services",
        category: "Emergency Services",
        address: "Connaught Place, New Delhi, Delhi 110001",
        coordinates: (28.6315, 77.2167),
        phone: "+91-11-2331-1111",
        email: None,
        website: None,
        operating_hours: "24/7",
        capacity: 25,
        current_availability: 18,
    },
    ResourceSeed {
        name: "Manas Mental Health Centre",
        description: "Mental health support and counseling services",
        category: "Mental Health",
        address: "Defence Colony, New Delhi, Delhi 110024",
        coordinates: (28.5706, 77.2294),
        phone: "+91-11-2433-7000",
        email: Some("support@manashealth.org"),
        website: Some("https://manashealth.org"),
        operating_hours: "Mon-Sat 9AM-6PM",
        capacity: 100,
        current_availability: 25,
    },
];

struct VolunteerSeed {
    name: &'static str,
    email: &'static str,
    phone: &'static str,
    skills: &'static str,
    availability: &'static str,
    location: &'static str,
    coordinates: (f64, f64),
}

const VOLUNTEERS: &[VolunteerSeed] = &[
    VolunteerSeed {
        name: "Rajesh Kumar",
        email: "rajesh.kumar@email.com",
        phone: "+91-98765-43210",
        skills: "First Aid, Transportation",
        availability: "Weekends",
        location: "Connaught Place, Delhi",
        coordinates: (28.6315, 77.2167),
    },
    VolunteerSeed {
        name: "Priya Sharma",
        email: "priya.sharma@email.com",
        phone: "+91-87654-32109",
        skills: "Counseling, Food Service",
        availability: "Evenings",
        location: "Karol Bagh, Delhi",
        coordinates: (28.6519, 77.1909),
    },
    VolunteerSeed {
        name: "Amit Singh",
        email: "amit.singh@email.com",
        phone: "+91-76543-21098",
        skills: "Transportation, General Help",
        availability: "Flexible",
        location: "Gurgaon, Haryana",
        coordinates: (28.4595, 77.0266),
    },
    VolunteerSeed {
        name: "Sunita Devi",
        email: "sunita.devi@email.com",
        phone: "+91-65432-10987",
        skills: "Medical Care, Community Outreach",
        availability: "Mornings",
        location: "Defence Colony, Delhi",
        coordinates: (28.5706, 77.2294),
    },
];

/// Counts of records written by [`load_sample_directory`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SampleSummary {
    pub categories: usize,
    pub resources: usize,
    pub volunteers: usize,
}

fn category_record(seed: &CategorySeed, now: DateTime<Utc>) -> Category {
    Category {
        id: CategoryId::generate(),
        name: seed.name.to_string(),
        description: Some(seed.description.to_string()),
        icon: Some(seed.icon.to_string()),
        color: Some(seed.color.to_string()),
        created_at: now,
        updated_at: now,
    }
}

/// Insert the default categories when the table is empty. Returns how many were written.
pub fn seed_default_categories<S>(store: &S) -> Result<usize, StoreError>
where
    S: DirectoryStore + ?Sized,
{
    if !store.categories()?.is_empty() {
        return Ok(0);
    }

    let now = Utc::now();
    for seed in CATEGORIES {
        store.insert_category(category_record(seed, now))?;
    }
    tracing::info!(count = CATEGORIES.len(), "default categories seeded");
    Ok(CATEGORIES.len())
}

/// Load the demonstration resources and volunteers.
///
/// Missing categories are created first. Volunteers whose email already exists are skipped,
/// so running the loader twice only duplicates resources.
pub fn load_sample_directory<S>(store: &S) -> Result<SampleSummary, StoreError>
where
    S: DirectoryStore + ?Sized,
{
    let mut summary = SampleSummary::default();
    let now = Utc::now();

    let mut categories = store.categories()?;
    for seed in CATEGORIES {
        if categories.iter().all(|category| category.name != seed.name) {
            categories.push(store.insert_category(category_record(seed, now))?);
            summary.categories += 1;
        }
    }

    for seed in RESOURCES {
        let category_id = categories
            .iter()
            .find(|category| category.name == seed.category)
            .map(|category| category.id.clone());
        let (latitude, longitude) = seed.coordinates;
        store.insert_resource(Resource {
            id: ResourceId::generate(),
            name: seed.name.to_string(),
            description: Some(seed.description.to_string()),
            category_id,
            address: seed.address.to_string(),
            latitude: Some(latitude),
            longitude: Some(longitude),
            phone: Some(seed.phone.to_string()),
            email: seed.email.map(str::to_string),
            website: seed.website.map(str::to_string),
            operating_hours: Some(seed.operating_hours.to_string()),
            capacity: Some(seed.capacity),
            current_availability: Some(seed.current_availability),
            status: ResourceStatus::Active,
            created_at: now,
            updated_at: now,
        })?;
        summary.resources += 1;
    }

    for seed in VOLUNTEERS {
        if store.volunteer_by_email(seed.email)?.is_some() {
            continue;
        }
        let (latitude, longitude) = seed.coordinates;
        store.insert_volunteer(Volunteer {
            id: VolunteerId::generate(),
            name: seed.name.to_string(),
            email: seed.email.to_string(),
            phone: Some(seed.phone.to_string()),
            skills: seed.skills.to_string(),
            availability: seed.availability.to_string(),
            location: Some(seed.location.to_string()),
            latitude: Some(latitude),
            longitude: Some(longitude),
            status: VolunteerStatus::Active,
            created_at: now,
            updated_at: now,
        })?;
        summary.volunteers += 1;
    }

    tracing::info!(
        categories = summary.categories,
        resources = summary.resources,
        volunteers = summary.volunteers,
        "sample directory loaded"
    );
    Ok(summary)
}
