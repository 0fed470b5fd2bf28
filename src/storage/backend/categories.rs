//! 横幅分类树

use std::collections::HashMap;

use sea_orm::{ActiveModelTrait, ActiveValue::Set, EntityTrait, QueryOrder, QuerySelect};

use super::SeaOrmStorage;
use super::converters::model_to_category;
use crate::errors::{AffiliatesError, Result};
use crate::storage::models::{Category, CategoryInput, CategoryNode};

use migration::entities::{banner, category};

/// 按树的先序遍历顺序排列分类，同级按名称排序
///
/// `direct_clicks` 为各分类自身横幅的点击数，返回的 `link_clicks` 含全部后代。
pub fn build_category_tree(
    categories: Vec<Category>,
    direct_clicks: &HashMap<i64, i64>,
) -> Vec<CategoryNode> {
    let known: HashMap<i64, usize> = categories
        .iter()
        .enumerate()
        .map(|(i, c)| (c.id, i))
        .collect();

    let mut children: HashMap<Option<i64>, Vec<usize>> = HashMap::new();
    for (i, c) in categories.iter().enumerate() {
        // 父节点缺失时当作根节点
        let parent = c.parent_id.filter(|p| known.contains_key(p));
        children.entry(parent).or_default().push(i);
    }
    for list in children.values_mut() {
        list.sort_by(|a, b| {
            categories[*a]
                .name
                .cmp(&categories[*b].name)
                .then(categories[*a].id.cmp(&categories[*b].id))
        });
    }

    fn subtree_clicks(
        idx: usize,
        categories: &[Category],
        children: &HashMap<Option<i64>, Vec<usize>>,
        direct: &HashMap<i64, i64>,
        memo: &mut HashMap<usize, i64>,
    ) -> i64 {
        if let Some(v) = memo.get(&idx) {
            return *v;
        }
        let id = categories[idx].id;
        let mut total = direct.get(&id).copied().unwrap_or(0);
        if let Some(kids) = children.get(&Some(id)) {
            for kid in kids {
                total += subtree_clicks(*kid, categories, children, direct, memo);
            }
        }
        memo.insert(idx, total);
        total
    }

    let mut memo = HashMap::new();
    let mut out = Vec::with_capacity(categories.len());
    let mut stack: Vec<(usize, usize)> = children
        .get(&None)
        .map(|roots| roots.iter().rev().map(|i| (*i, 0)).collect())
        .unwrap_or_default();

    while let Some((idx, depth)) = stack.pop() {
        let c = &categories[idx];
        let kids = children.get(&Some(c.id)).cloned().unwrap_or_default();
        out.push(CategoryNode {
            id: c.id,
            name: c.name.clone(),
            parent_id: c.parent_id,
            depth,
            children: kids.iter().map(|k| categories[*k].id).collect(),
            link_clicks: subtree_clicks(idx, &categories, &children, direct_clicks, &mut memo),
        });
        for kid in kids.iter().rev() {
            stack.push((*kid, depth + 1));
        }
    }
    out
}

impl SeaOrmStorage {
    pub async fn list_categories(&self) -> Result<Vec<CategoryNode>> {
        let categories: Vec<Category> = category::Entity::find()
            .order_by_asc(category::Column::Id)
            .all(&self.db)
            .await?
            .into_iter()
            .map(model_to_category)
            .collect();

        let direct = self.clicks_per_category().await?;
        Ok(build_category_tree(categories, &direct))
    }

    pub async fn get_category(&self, id: i64) -> Result<Option<Category>> {
        Ok(category::Entity::find_by_id(id)
            .one(&self.db)
            .await?
            .map(model_to_category))
    }

    pub async fn create_category(&self, input: CategoryInput) -> Result<Category> {
        if input.name.trim().is_empty() {
            return Err(AffiliatesError::validation("Category name must not be empty"));
        }
        if let Some(parent) = input.parent_id
            && self.get_category(parent).await?.is_none()
        {
            return Err(AffiliatesError::validation(format!(
                "Parent category {} does not exist",
                parent
            )));
        }

        let model = category::ActiveModel {
            name: Set(input.name.trim().to_string()),
            parent_id: Set(input.parent_id),
            ..Default::default()
        }
        .insert(&self.db)
        .await?;
        Ok(model_to_category(model))
    }

    /// 更新名称或移动到新的父节点；不允许移动到自身的子树下
    pub async fn update_category(&self, id: i64, input: CategoryInput) -> Result<Category> {
        let existing = category::Entity::find_by_id(id)
            .one(&self.db)
            .await?
            .ok_or_else(|| AffiliatesError::not_found(format!("Category {}", id)))?;

        if input.name.trim().is_empty() {
            return Err(AffiliatesError::validation("Category name must not be empty"));
        }

        if let Some(mut cursor) = input.parent_id {
            loop {
                if cursor == id {
                    return Err(AffiliatesError::validation(
                        "A category cannot be moved under itself",
                    ));
                }
                match self.get_category(cursor).await? {
                    Some(parent) => match parent.parent_id {
                        Some(next) => cursor = next,
                        None => break,
                    },
                    None => {
                        return Err(AffiliatesError::validation(format!(
                            "Parent category {} does not exist",
                            cursor
                        )));
                    }
                }
            }
        }

        let mut active: category::ActiveModel = existing.into();
        active.name = Set(input.name.trim().to_string());
        active.parent_id = Set(input.parent_id);
        Ok(model_to_category(active.update(&self.db).await?))
    }

    /// 删除分类（子分类和横幅级联删除）
    pub async fn delete_category(&self, id: i64) -> Result<()> {
        let result = category::Entity::delete_by_id(id).exec(&self.db).await?;
        if result.rows_affected == 0 {
            return Err(AffiliatesError::not_found(format!("Category {}", id)));
        }
        self.invalidate_referral_cache();
        Ok(())
    }

    /// 分类及其全部后代中横幅的点击总数
    pub async fn category_link_clicks(&self, id: i64) -> Result<i64> {
        self.list_categories()
            .await?
            .into_iter()
            .find(|node| node.id == id)
            .map(|node| node.link_clicks)
            .ok_or_else(|| AffiliatesError::not_found(format!("Category {}", id)))
    }

    async fn clicks_per_category(&self) -> Result<HashMap<i64, i64>> {
        let banner_categories: Vec<(i64, i64)> = banner::Entity::find()
            .select_only()
            .column(banner::Column::Id)
            .column(banner::Column::CategoryId)
            .into_tuple()
            .all(&self.db)
            .await?;
        let banner_clicks = self.all_banner_link_clicks().await?;

        let mut per_category = HashMap::new();
        for (banner_id, category_id) in banner_categories {
            *per_category.entry(category_id).or_insert(0) +=
                banner_clicks.get(&banner_id).copied().unwrap_or(0);
        }
        Ok(per_category)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cat(id: i64, name: &str, parent_id: Option<i64>) -> Category {
        Category {
            id,
            name: name.to_string(),
            parent_id,
        }
    }

    #[test]
    fn test_tree_order_depth_and_rollup() {
        let categories = vec![
            cat(1, "Firefox", None),
            cat(2, "Mobile", Some(1)),
            cat(3, "Desktop", Some(1)),
            cat(4, "Android", Some(2)),
            cat(5, "Add-ons", None),
        ];
        let direct = HashMap::from([(4, 7), (3, 2), (1, 1), (5, 10)]);

        let tree = build_category_tree(categories, &direct);
        let order: Vec<(i64, usize)> = tree.iter().map(|n| (n.id, n.depth)).collect();
        assert_eq!(order, vec![(5, 0), (1, 0), (3, 1), (2, 1), (4, 2)]);

        let firefox = tree.iter().find(|n| n.id == 1).unwrap();
        assert_eq!(firefox.link_clicks, 10);
        assert_eq!(firefox.children, vec![3, 2]);
        let mobile = tree.iter().find(|n| n.id == 2).unwrap();
        assert_eq!(mobile.link_clicks, 7);
    }

    #[test]
    fn test_orphan_is_treated_as_root() {
        let tree = build_category_tree(vec![cat(9, "Lost", Some(42))], &HashMap::new());
        assert_eq!(tree.len(), 1);
        assert_eq!(tree[0].depth, 0);
        assert_eq!(tree[0].link_clicks, 0);
    }
}
