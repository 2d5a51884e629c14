//! Repository Integration Tests
//!
//! Every repository against an in-memory SQLite database.

#[cfg(test)]
mod tests {
    use std::path::PathBuf;
    use std::sync::Arc;

    use crate::domain::ordering::is_contiguous;
    use crate::domain::{
        Board, Card, CardPatch, ChecklistItem, DomainError, Label, List, ListPatch, Ordered,
        Priority, RowId,
    };
    use crate::repository::{
        init_db, BoardRepository, CardRepository, ChecklistRepository, LabelRepository,
        ListRepository, OrderedRepository, Repository, SharedConnection,
    };

    struct Repos {
        conn: SharedConnection,
        boards: BoardRepository,
        lists: ListRepository,
        cards: CardRepository,
        checklist: ChecklistRepository,
        labels: LabelRepository,
    }

    async fn setup_test_db() -> Repos {
        let db_state = init_db(&PathBuf::from(":memory:"))
            .await
            .expect("Failed to init test DB");
        let conn = db_state.connection();
        Repos {
            conn: conn.clone(),
            boards: BoardRepository::new(conn.clone()),
            lists: ListRepository::new(conn.clone()),
            cards: CardRepository::new(conn.clone()),
            checklist: ChecklistRepository::new(conn.clone()),
            labels: LabelRepository::new(conn),
        }
    }

    async fn board(repos: &Repos, title: &str) -> RowId {
        let board = Board::new(title.to_string(), None);
        repos.boards.create(&board).await.unwrap().id
    }

    async fn list(repos: &Repos, board_id: RowId, title: &str) -> RowId {
        let list = List::new(title.to_string(), board_id);
        repos.lists.create(&list).await.unwrap().id
    }

    async fn card(repos: &Repos, list_id: RowId, title: &str) -> RowId {
        let card = Card::new(title.to_string(), list_id);
        repos.cards.create(&card).await.unwrap().id
    }

    async fn card_titles(repos: &Repos, list_id: RowId) -> Vec<String> {
        let cards = repos.cards.children(list_id).await.unwrap();
        assert!(is_contiguous(cards.iter().map(|c| c.order())));
        cards.into_iter().map(|c| c.title).collect()
    }

    #[tokio::test]
    async fn test_create_card_appends() {
        let repos = setup_test_db().await;
        let b = board(&repos, "Sprint").await;
        let l = list(&repos, b, "To Do").await;

        let first = repos.cards.create(&Card::new("  A ".to_string(), l)).await.unwrap();
        let second = repos.cards.create(&Card::new("B".to_string(), l)).await.unwrap();

        assert!(first.id > 0);
        assert_eq!(first.title, "A");
        assert_eq!(first.order, 0);
        assert_eq!(second.order, 1);
        assert_eq!(first.priority, Priority::Medium);
    }

    #[tokio::test]
    async fn test_create_card_in_missing_list() {
        let repos = setup_test_db().await;
        let err = repos.cards.create(&Card::new("Orphan".to_string(), 42)).await;
        assert!(matches!(err, Err(DomainError::NotFound(_))));
        assert!(repos.cards.list().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_reposition_delete_move_scenario() {
        let repos = setup_test_db().await;
        let b = board(&repos, "Scenario").await;
        let l = list(&repos, b, "L").await;
        let m = list(&repos, b, "M").await;
        let c0 = card(&repos, l, "C0").await;
        let c1 = card(&repos, l, "C1").await;
        let c2 = card(&repos, l, "C2").await;

        repos.cards.reposition(c2, 0).await.unwrap();
        assert_eq!(card_titles(&repos, l).await, ["C2", "C0", "C1"]);

        repos.cards.delete(c0).await.unwrap();
        assert_eq!(card_titles(&repos, l).await, ["C2", "C1"]);

        let moved = repos.cards.move_to(c1, m, Some(0)).await.unwrap();
        assert_eq!((moved.list_id, moved.order), (m, 0));
        assert_eq!(card_titles(&repos, l).await, ["C2"]);
        assert_eq!(card_titles(&repos, m).await, ["C1"]);
    }

    #[tokio::test]
    async fn test_reposition_round_trip() {
        let repos = setup_test_db().await;
        let b = board(&repos, "Round").await;
        let l = list(&repos, b, "L").await;
        let mut ids = Vec::new();
        for title in ["a", "b", "c", "d", "e"] {
            ids.push(card(&repos, l, title).await);
        }

        repos.cards.reposition(ids[1], 4).await.unwrap();
        assert_eq!(card_titles(&repos, l).await, ["a", "c", "d", "e", "b"]);
        repos.cards.reposition(ids[1], 1).await.unwrap();
        assert_eq!(card_titles(&repos, l).await, ["a", "b", "c", "d", "e"]);
    }

    #[tokio::test]
    async fn test_out_of_range_is_rejected() {
        let repos = setup_test_db().await;
        let b = board(&repos, "Range").await;
        let l = list(&repos, b, "L").await;
        let m = list(&repos, b, "M").await;
        let a = card(&repos, l, "a").await;
        card(&repos, l, "b").await;

        let err = repos.cards.reposition(a, 2).await;
        assert!(matches!(err, Err(DomainError::Conflict(_))));
        let err = repos.cards.reposition(a, -1).await;
        assert!(matches!(err, Err(DomainError::Conflict(_))));
        let err = repos.cards.move_to(a, m, Some(1)).await;
        assert!(matches!(err, Err(DomainError::Conflict(_))));

        assert_eq!(card_titles(&repos, l).await, ["a", "b"]);
        assert!(card_titles(&repos, m).await.is_empty());
    }

    #[tokio::test]
    async fn test_move_same_list_without_order_goes_last() {
        let repos = setup_test_db().await;
        let b = board(&repos, "Same").await;
        let l = list(&repos, b, "L").await;
        let a = card(&repos, l, "a").await;
        card(&repos, l, "b").await;
        card(&repos, l, "c").await;

        repos.cards.move_to(a, l, None).await.unwrap();
        assert_eq!(card_titles(&repos, l).await, ["b", "c", "a"]);
    }

    #[tokio::test]
    async fn test_patch_moves_and_updates_together() {
        let repos = setup_test_db().await;
        let b = board(&repos, "Patch").await;
        let l = list(&repos, b, "L").await;
        let m = list(&repos, b, "M").await;
        let a = card(&repos, l, "a").await;
        card(&repos, l, "b").await;
        card(&repos, m, "x").await;

        let patch: CardPatch = serde_json::from_str(&format!(
            r#"{{"listId":{},"order":0,"title":"moved","priority":"HIGH"}}"#,
            m
        ))
        .unwrap();
        let updated = repos.cards.apply_patch(a, &patch).await.unwrap();

        assert_eq!(updated.title, "moved");
        assert_eq!(updated.priority, Priority::High);
        assert_eq!(card_titles(&repos, l).await, ["b"]);
        assert_eq!(card_titles(&repos, m).await, ["moved", "x"]);
    }

    #[tokio::test]
    async fn test_failed_patch_rolls_back_move() {
        let repos = setup_test_db().await;
        let b = board(&repos, "Rollback").await;
        let l = list(&repos, b, "L").await;
        let m = list(&repos, b, "M").await;
        let a = card(&repos, l, "a").await;
        card(&repos, l, "b").await;

        let patch = CardPatch {
            title: Some("   ".to_string()),
            list_id: Some(m),
            ..Default::default()
        };
        let err = repos.cards.apply_patch(a, &patch).await;
        assert!(matches!(err, Err(DomainError::InvalidInput(_))));

        assert_eq!(card_titles(&repos, l).await, ["a", "b"]);
        assert!(card_titles(&repos, m).await.is_empty());
    }

    #[tokio::test]
    async fn test_list_cap() {
        let repos = setup_test_db().await;
        let b = board(&repos, "Capped").await;
        let capped = ListRepository::new(repos.conn.clone()).with_max_per_board(Some(2));
        capped.create(&List::new("one".to_string(), b)).await.unwrap();
        capped.create(&List::new("two".to_string(), b)).await.unwrap();
        let err = capped.create(&List::new("three".to_string(), b)).await;

        match err {
            Err(DomainError::InvalidInput(msg)) => {
                assert_eq!(msg, "Maximum 2 lists allowed per board")
            }
            other => panic!("expected cap error, got {:?}", other),
        }
        assert_eq!(repos.lists.children(b).await.unwrap().len(), 2);
    }

    #[tokio::test]
    async fn test_board_seeds_default_lists_up_to_cap() {
        let repos = setup_test_db().await;
        let defaults: Vec<String> = ["To Do", "In Progress", "Review", "Done"]
            .iter()
            .map(|s| s.to_string())
            .collect();

        let full = repos
            .boards
            .create_with_lists(&Board::new("Full".to_string(), None), &defaults, None)
            .await
            .unwrap();
        let capped = repos
            .boards
            .create_with_lists(&Board::new("Capped".to_string(), None), &defaults, Some(3))
            .await
            .unwrap();

        let titles: Vec<String> = repos
            .lists
            .children(full.id)
            .await
            .unwrap()
            .into_iter()
            .map(|l| l.title)
            .collect();
        assert_eq!(titles, defaults);
        assert_eq!(repos.lists.children(capped.id).await.unwrap().len(), 3);
    }

    #[tokio::test]
    async fn test_list_patch_repositions() {
        let repos = setup_test_db().await;
        let b = board(&repos, "Lists").await;
        let first = list(&repos, b, "first").await;
        list(&repos, b, "second").await;

        let patch = ListPatch {
            title: Some("last".to_string()),
            order: Some(1),
            ..Default::default()
        };
        let updated = repos.lists.apply_patch(first, &patch).await.unwrap();
        assert_eq!(updated.order, 1);

        let titles: Vec<String> = repos
            .lists
            .children(b)
            .await
            .unwrap()
            .into_iter()
            .map(|l| l.title)
            .collect();
        assert_eq!(titles, ["second", "last"]);
    }

    #[tokio::test]
    async fn test_move_list_to_another_board() {
        let repos = setup_test_db().await;
        let from = board(&repos, "From").await;
        let to = board(&repos, "To").await;
        let a = list(&repos, from, "a").await;
        list(&repos, from, "b").await;
        list(&repos, to, "x").await;

        let moved = repos.lists.move_to(a, to, None).await.unwrap();
        assert_eq!((moved.board_id, moved.order), (to, 1));

        let source = repos.lists.children(from).await.unwrap();
        assert_eq!(source.len(), 1);
        assert_eq!(source[0].order, 0);
        assert!(matches!(
            repos.lists.move_to(a, 77, None).await,
            Err(DomainError::NotFound(_))
        ));
    }

    #[tokio::test]
    async fn test_delete_list_closes_gap_and_cascades() {
        let repos = setup_test_db().await;
        let b = board(&repos, "Gaps").await;
        list(&repos, b, "a").await;
        let middle = list(&repos, b, "b").await;
        list(&repos, b, "c").await;
        let doomed = card(&repos, middle, "doomed").await;

        repos.lists.delete(middle).await.unwrap();

        let lists = repos.lists.children(b).await.unwrap();
        assert!(is_contiguous(lists.iter().map(|l| l.order())));
        assert_eq!(lists.len(), 2);
        assert!(repos.cards.find_by_id(doomed).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_delete_missing_is_not_found() {
        let repos = setup_test_db().await;
        assert!(matches!(repos.cards.delete(9).await, Err(DomainError::NotFound(_))));
        assert!(matches!(repos.boards.delete(9).await, Err(DomainError::NotFound(_))));
        assert!(matches!(repos.labels.delete(9).await, Err(DomainError::NotFound(_))));
    }

    #[tokio::test]
    async fn test_checklist_reorder() {
        let repos = setup_test_db().await;
        let b = board(&repos, "Checklist").await;
        let l = list(&repos, b, "L").await;
        let c = card(&repos, l, "card").await;
        let other = card(&repos, l, "other").await;

        let mut ids = Vec::new();
        for title in ["one", "two", "three"] {
            let item = ChecklistItem::new(title.to_string(), c);
            ids.push(repos.checklist.create(&item).await.unwrap().id);
        }

        let err = repos.checklist.reorder_in_card(ids[2], Some(other), 0).await;
        assert!(matches!(err, Err(DomainError::InvalidInput(_))));

        let moved = repos.checklist.reorder_in_card(ids[2], Some(c), 0).await.unwrap();
        assert_eq!(moved.order, 0);

        let titles: Vec<String> = repos
            .checklist
            .children(c)
            .await
            .unwrap()
            .into_iter()
            .map(|i| i.title)
            .collect();
        assert_eq!(titles, ["three", "one", "two"]);
    }

    #[tokio::test]
    async fn test_labels_attach_and_detach() {
        let repos = setup_test_db().await;
        let b = board(&repos, "Labels").await;
        let elsewhere = board(&repos, "Elsewhere").await;
        let l = list(&repos, b, "L").await;
        let c = card(&repos, l, "card").await;

        let bug = repos
            .labels
            .create(&Label::new("Bug".to_string(), "#f00".to_string(), b))
            .await
            .unwrap();
        let foreign = repos
            .labels
            .create(&Label::new("Other".to_string(), "#00ff00".to_string(), elsewhere))
            .await
            .unwrap();
        let bad_color = repos
            .labels
            .create(&Label::new("Bad".to_string(), "red".to_string(), b))
            .await;
        assert!(matches!(bad_color, Err(DomainError::InvalidInput(_))));

        let link = repos.labels.attach(c, bug.id).await.unwrap();
        assert_eq!(link.label.name, "Bug");
        assert!(matches!(
            repos.labels.attach(c, bug.id).await,
            Err(DomainError::Conflict(_))
        ));
        assert!(matches!(
            repos.labels.attach(c, foreign.id).await,
            Err(DomainError::InvalidInput(_))
        ));

        let detail = repos.cards.detail(c).await.unwrap().unwrap();
        assert_eq!(detail.labels, vec![bug.clone()]);

        repos.labels.detach(c, bug.id).await.unwrap();
        assert!(matches!(
            repos.labels.detach(c, bug.id).await,
            Err(DomainError::NotFound(_))
        ));
        assert!(repos.labels.for_card(c).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_board_tree_and_cascade() {
        let repos = setup_test_db().await;
        let b = board(&repos, "Tree").await;
        let l = list(&repos, b, "L").await;
        let c = card(&repos, l, "card").await;
        repos
            .checklist
            .create(&ChecklistItem::new("step".to_string(), c))
            .await
            .unwrap();
        let label = repos
            .labels
            .create(&Label::new("Ops".to_string(), "#123456".to_string(), b))
            .await
            .unwrap();
        repos.labels.attach(c, label.id).await.unwrap();

        let tree = repos.boards.find_tree(b).await.unwrap().unwrap();
        assert_eq!(tree.lists.len(), 1);
        assert_eq!(tree.lists[0].cards[0].checklist_items[0].title, "step");
        assert_eq!(tree.lists[0].cards[0].labels[0].name, "Ops");
        assert_eq!(tree.labels.len(), 1);

        repos.boards.delete(b).await.unwrap();
        assert!(repos.boards.find_tree(b).await.unwrap().is_none());
        assert!(repos.cards.find_by_id(c).await.unwrap().is_none());
        assert!(repos.checklist.list().await.unwrap().is_empty());
        assert!(repos.labels.list().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_boards_listed_newest_first() {
        let repos = setup_test_db().await;
        board(&repos, "older").await;
        board(&repos, "newer").await;

        let titles: Vec<String> = repos
            .boards
            .list()
            .await
            .unwrap()
            .into_iter()
            .map(|b| b.title)
            .collect();
        assert_eq!(titles, ["newer", "older"]);
    }

    #[tokio::test]
    async fn test_file_database_persists_across_reopen() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("data").join("kanban.db");

        {
            let db = init_db(&path).await.unwrap();
            let boards = BoardRepository::new(db.connection());
            let defaults = vec!["Backlog".to_string()];
            boards
                .create_with_lists(&Board::new("Kept".to_string(), None), &defaults, None)
                .await
                .unwrap();
        }

        let db = init_db(&path).await.unwrap();
        assert_eq!(db.path(), path.as_path());
        let boards = BoardRepository::new(db.connection()).list().await.unwrap();
        assert_eq!(boards.len(), 1);
        let tree = BoardRepository::new(db.connection())
            .find_tree(boards[0].id)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(tree.lists[0].list.title, "Backlog");
    }

    #[tokio::test]
    async fn test_move_list_into_full_board_is_rejected() {
        let repos = setup_test_db().await;
        let a = board(&repos, "A").await;
        let b = board(&repos, "B").await;
        let capped = ListRepository::new(repos.conn.clone()).with_max_per_board(Some(1));
        let la = capped.create(&List::new("la".to_string(), a)).await.unwrap();
        let lb = capped.create(&List::new("lb".to_string(), b)).await.unwrap();

        let err = capped.move_to(la.id, b, None).await;
        match err {
            Err(DomainError::InvalidInput(msg)) => {
                assert_eq!(msg, "Maximum 1 lists allowed per board")
            }
            other => panic!("expected cap error, got {:?}", other),
        }
        assert_eq!(capped.children(a).await.unwrap().len(), 1);
        assert_eq!(capped.children(b).await.unwrap().len(), 1);

        // Staying on the same board is never blocked by the cap
        let same = capped.move_to(lb.id, b, Some(0)).await.unwrap();
        assert_eq!((same.board_id, same.order), (b, 0));
    }

    #[tokio::test]
    async fn test_card_leaves_labels_behind_when_changing_board() {
        let repos = setup_test_db().await;
        let a = board(&repos, "A").await;
        let b = board(&repos, "B").await;
        let la = list(&repos, a, "la").await;
        let la2 = list(&repos, a, "la2").await;
        let lb = list(&repos, b, "lb").await;
        let moved = card(&repos, la, "moved").await;
        let patched = card(&repos, la, "patched").await;

        let label = repos
            .labels
            .create(&Label::new("Bug".to_string(), "#f00".to_string(), a))
            .await
            .unwrap();
        repos.labels.attach(moved, label.id).await.unwrap();
        repos.labels.attach(patched, label.id).await.unwrap();

        repos.cards.move_to(moved, la2, None).await.unwrap();
        assert_eq!(repos.labels.for_card(moved).await.unwrap(), vec![label.clone()]);

        repos.cards.move_to(moved, lb, None).await.unwrap();
        assert!(repos.labels.for_card(moved).await.unwrap().is_empty());

        let patch = CardPatch {
            list_id: Some(lb),
            ..Default::default()
        };
        repos.cards.apply_patch(patched, &patch).await.unwrap();
        assert!(repos.labels.for_card(patched).await.unwrap().is_empty());

        let tree = repos.boards.find_tree(b).await.unwrap().unwrap();
        assert!(tree.lists[0].cards.iter().all(|c| c.labels.is_empty()));
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_concurrent_moves_keep_orders_contiguous() {
        let repos = setup_test_db().await;
        let b = board(&repos, "Busy").await;
        let l = list(&repos, b, "L").await;
        let m = list(&repos, b, "M").await;
        let mut ids = Vec::new();
        for i in 0..10 {
            ids.push(card(&repos, l, &format!("l{}", i)).await);
            ids.push(card(&repos, m, &format!("m{}", i)).await);
        }

        let cards = Arc::new(CardRepository::new(repos.conn.clone()));
        let mut handles = Vec::new();
        for i in 0..60usize {
            let cards = cards.clone();
            let id = ids[(i * 7) % ids.len()];
            let target = if i % 2 == 0 { l } else { m };
            handles.push(tokio::spawn(async move {
                if i % 3 == 0 {
                    cards.move_to(id, target, None).await
                } else {
                    cards.reposition(id, (i % 6) as i32).await
                }
            }));
        }

        for handle in handles {
            match handle.await.unwrap() {
                Ok(_) | Err(DomainError::Conflict(_)) => {}
                Err(other) => panic!("unexpected error: {:?}", other),
            }
        }

        let in_l = cards.children(l).await.unwrap();
        let in_m = cards.children(m).await.unwrap();
        assert!(is_contiguous(in_l.iter().map(|c| c.order())));
        assert!(is_contiguous(in_m.iter().map(|c| c.order())));
        assert_eq!(in_l.len() + in_m.len(), 20);
    }

    #[tokio::test]
    async fn test_move_checklist_item_between_cards() {
        let repos = setup_test_db().await;
        let b = board(&repos, "Items").await;
        let l = list(&repos, b, "L").await;
        let from = card(&repos, l, "from").await;
        let to = card(&repos, l, "to").await;

        let mut ids = Vec::new();
        for title in ["one", "two", "three"] {
            let item = ChecklistItem::new(title.to_string(), from);
            ids.push(repos.checklist.create(&item).await.unwrap().id);
        }
        repos
            .checklist
            .create(&ChecklistItem::new("existing".to_string(), to))
            .await
            .unwrap();

        let moved = repos.checklist.move_to(ids[0], to, Some(0)).await.unwrap();
        assert_eq!((moved.card_id, moved.order), (to, 0));

        let source: Vec<(String, i32)> = repos
            .checklist
            .children(from)
            .await
            .unwrap()
            .into_iter()
            .map(|i| (i.title, i.order))
            .collect();
        assert_eq!(source, [("two".to_string(), 0), ("three".to_string(), 1)]);

        let target: Vec<String> = repos
            .checklist
            .children(to)
            .await
            .unwrap()
            .into_iter()
            .map(|i| i.title)
            .collect();
        assert_eq!(target, ["one", "existing"]);

        let err = repos.checklist.move_to(ids[1], to, Some(5)).await;
        assert!(matches!(err, Err(DomainError::Conflict(_))));
    }
}
