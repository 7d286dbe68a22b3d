use balanced_tree::Tree;

fn main() {
    let tree: Tree<i32> = (1..=6).collect();

    println!("Level-order traversal:");
    tree.traverse_level_order(|depth, key| {
        println!("Depth: {}, Key: {}", depth, key);
    });
}
