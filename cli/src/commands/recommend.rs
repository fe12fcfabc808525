use anyhow::Result;
use rand::SeedableRng;
use rand::rngs::StdRng;

use nutrismart_core::recommend::RecommendationSource;
use nutrismart_core::service::NutritionService;

pub(crate) fn cmd_recommend(
    svc: &NutritionService,
    source: &dyn RecommendationSource,
    email: &str,
    seed: Option<u64>,
    json: bool,
) -> Result<()> {
    let foods = match seed {
        Some(seed) => svc.recommend_foods(email, source, &mut StdRng::seed_from_u64(seed))?,
        None => svc.recommend_foods(email, source, &mut rand::rng())?,
    };

    if json {
        println!("{}", serde_json::to_string_pretty(&foods)?);
        return Ok(());
    }

    let profile = svc.get_profile(email)?;
    println!("Recommended for your {} diet:", profile.diet);
    for food in &foods {
        println!("  - {food}");
    }

    Ok(())
}
