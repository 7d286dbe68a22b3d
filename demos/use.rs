use balanced_tree::{render, Order, Tree};

fn main() {
    let mut tree = Tree::new();
    for key in [10, 20, 30, 40, 50, 25] {
        tree.insert(key);
    }
    tree.insert(25);
    assert_eq!(tree.get(&25), Some(&25));
    println!("{}", render::diagram(&tree));

    tree.remove(&40);
    assert!(tree.get(&40).is_none());
    println!("{tree}");

    for order in [Order::PreOrder, Order::InOrder, Order::PostOrder] {
        print!("{order:?}: ");
        for key in tree.traverse(order) {
            print!("{key} ");
        }
        println!();
    }
    println!("height = {}", tree.height());

    tree.clear();
    assert_eq!(tree.height(), 0);
}
