use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use sqlx::FromRow;

/// One entry of a drink recipe.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Ingredient {
    pub name: String,
    pub color: String,
    pub parts: serde_json::Number,
}

/// A row of the `drinks` table. The recipe is persisted as a JSON-encoded
/// array of ingredients and decoded on read.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Drink {
    pub id: i32,
    pub title: String,
    pub recipe: String,
}

impl Drink {
    /// Decode the persisted recipe column.
    pub fn ingredients(&self) -> Result<Vec<Ingredient>, serde_json::Error> {
        serde_json::from_str(&self.recipe)
    }

    /// Public projection: ingredient names are omitted.
    pub fn short(&self) -> Result<Value, serde_json::Error> {
        let recipe: Vec<Value> = self
            .ingredients()?
            .into_iter()
            .map(|i| json!({ "color": i.color, "parts": i.parts }))
            .collect();
        Ok(json!({ "id": self.id, "title": self.title, "recipe": recipe }))
    }

    /// Privileged projection: full ingredient detail.
    pub fn long(&self) -> Result<Value, serde_json::Error> {
        let recipe = self.ingredients()?;
        Ok(json!({ "id": self.id, "title": self.title, "recipe": recipe }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn water() -> Drink {
        Drink {
            id: 1,
            title: "Water".to_string(),
            recipe: r#"[{"name":"Water","color":"blue","parts":1}]"#.to_string(),
        }
    }

    fn matcha_latte() -> Drink {
        Drink {
            id: 2,
            title: "Matcha Latte".to_string(),
            recipe: r#"[
                {"name":"milk","color":"grey","parts":3},
                {"name":"matcha","color":"green","parts":1}
            ]"#
            .to_string(),
        }
    }

    #[test]
    fn short_omits_ingredient_names() {
        let view = water().short().unwrap();
        assert_eq!(view["id"], json!(1));
        assert_eq!(view["title"], json!("Water"));
        assert_eq!(view["recipe"], json!([{ "color": "blue", "parts": 1 }]));
    }

    #[test]
    fn long_keeps_full_detail() {
        let view = water().long().unwrap();
        assert_eq!(
            view["recipe"],
            json!([{ "name": "Water", "color": "blue", "parts": 1 }])
        );
    }

    #[test]
    fn recipe_order_is_preserved() {
        let view = matcha_latte().long().unwrap();
        assert_eq!(view["recipe"][0]["name"], json!("milk"));
        assert_eq!(view["recipe"][1]["name"], json!("matcha"));

        let short = matcha_latte().short().unwrap();
        assert_eq!(short["recipe"][0]["parts"], json!(3));
        assert!(short["recipe"][0].get("name").is_none());
        assert!(short["recipe"][1].get("name").is_none());
    }

    #[test]
    fn long_view_round_trips() {
        let drink = matcha_latte();
        let view = drink.long().unwrap();
        let reparsed: Vec<Ingredient> =
            serde_json::from_value(view["recipe"].clone()).unwrap();
        assert_eq!(reparsed, drink.ingredients().unwrap());
        assert_eq!(view["title"], json!(drink.title));
    }

    #[test]
    fn corrupt_recipe_fails_to_project() {
        let drink = Drink {
            id: 3,
            title: "Broken".to_string(),
            recipe: "not json".to_string(),
        };
        assert!(drink.short().is_err());
        assert!(drink.long().is_err());
    }
}
